pub mod docs_llm;

pub use docs_llm::OpenAiDocsAdapter;
