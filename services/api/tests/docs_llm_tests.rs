//! Tests the async-openai adapter against a local mock of an OpenAI-compatible
//! provider, so the exact request body and the error mapping are checked
//! without any live network calls.

use api_lib::{
    adapters::{
        docs_llm::{SYSTEM_INSTRUCTION, USER_PROMPT_PREFIX},
        OpenAiDocsAdapter,
    },
    web::{app_router, state::AppState},
};
use async_openai::config::OpenAIConfig;
use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{header, Request, StatusCode},
    routing::post,
    Json, Router,
};
use code_docs_core::{DocumentationService, PortError};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

#[derive(Clone)]
struct MockProvider {
    status: StatusCode,
    reply: Value,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl MockProvider {
    fn new(status: StatusCode, reply: Value) -> Self {
        Self {
            status,
            reply,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

async fn chat_completions(
    State(mock): State<MockProvider>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    mock.requests.lock().unwrap().push(body);
    (mock.status, Json(mock.reply.clone()))
}

/// Serves the mock on an ephemeral port and returns its API base URL.
async fn serve(mock: MockProvider) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .with_state(mock);
    tokio::spawn(async move { axum::serve(listener, app).await });
    format!("http://{}/v1", addr)
}

fn adapter(api_base: String) -> OpenAiDocsAdapter {
    let config = OpenAIConfig::new()
        .with_api_key("sk-test")
        .with_api_base(api_base);
    OpenAiDocsAdapter::new(
        OpenAiDocsAdapter::client_without_retries(config),
        "meta-llama/Llama-3-8b-chat-hf".to_string(),
        1000,
        0.3,
    )
}

fn completion(content: Value) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_710_460_800,
        "model": "meta-llama/Llama-3-8b-chat-hf",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn sends_one_request_with_the_fixed_prompt() {
    let mock = MockProvider::new(StatusCode::OK, completion(json!("# add\n\nAdds numbers.")));
    let docs = adapter(serve(mock.clone()).await);
    let code = "function add(a, b) {\n  return a + b\n}";

    let markdown = docs.generate_documentation(code).await.unwrap();

    assert_eq!(markdown, "# add\n\nAdds numbers.");
    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request["model"], "meta-llama/Llama-3-8b-chat-hf");
    assert_eq!(request["max_tokens"], 1000);
    let temperature = request["temperature"].as_f64().unwrap();
    assert!((temperature - 0.3).abs() < 1e-6);

    let messages = request["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[0]["content"], SYSTEM_INSTRUCTION);
    assert_eq!(messages[1]["role"], "user");
    assert_eq!(
        messages[1]["content"],
        format!("{}{}", USER_PROMPT_PREFIX, code)
    );
}

#[tokio::test]
async fn null_content_is_an_empty_response() {
    let mock = MockProvider::new(StatusCode::OK, completion(Value::Null));
    let docs = adapter(serve(mock).await);

    let err = docs.generate_documentation("x = 1").await.unwrap_err();

    assert_eq!(err, PortError::EmptyResponse);
}

#[tokio::test]
async fn empty_string_content_is_an_empty_response() {
    let mock = MockProvider::new(StatusCode::OK, completion(json!("")));
    let docs = adapter(serve(mock).await);

    assert_eq!(
        docs.generate_documentation("x = 1").await,
        Err(PortError::EmptyResponse)
    );
}

#[tokio::test]
async fn whitespace_content_is_returned_as_is() {
    let mock = MockProvider::new(StatusCode::OK, completion(json!("  \n")));
    let docs = adapter(serve(mock).await);

    assert_eq!(
        docs.generate_documentation("x = 1").await,
        Ok("  \n".to_string())
    );
}

#[tokio::test]
async fn server_error_is_not_retried() {
    let reply = json!({ "error": { "message": "upstream down" } });
    let mock = MockProvider::new(StatusCode::INTERNAL_SERVER_ERROR, reply);
    let docs = adapter(serve(mock.clone()).await);

    let outcome = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        docs.generate_documentation("x = 1"),
    )
    .await
    .expect("a failed call returns without backing off");

    assert!(matches!(outcome, Err(PortError::Provider(_))));
    assert_eq!(mock.requests().len(), 1);
}

#[tokio::test]
async fn rate_limit_is_not_retried() {
    let reply = json!({ "error": { "message": "Rate limit reached", "type": "requests" } });
    let mock = MockProvider::new(StatusCode::TOO_MANY_REQUESTS, reply);
    let docs = adapter(serve(mock.clone()).await);

    let outcome = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        docs.generate_documentation("x = 1"),
    )
    .await
    .expect("a rate-limited call returns without backing off");

    assert!(matches!(outcome, Err(PortError::Provider(_))));
    assert_eq!(mock.requests().len(), 1);
}

#[tokio::test]
async fn no_choices_is_an_empty_response() {
    let mut reply = completion(json!("unused"));
    reply["choices"] = json!([]);
    let docs = adapter(serve(MockProvider::new(StatusCode::OK, reply)).await);

    assert_eq!(
        docs.generate_documentation("x = 1").await,
        Err(PortError::EmptyResponse)
    );
}

#[tokio::test]
async fn provider_error_message_is_preferred() {
    let reply = json!({
        "error": {
            "message": "Invalid API key",
            "type": "invalid_request_error",
            "param": null,
            "code": "invalid_api_key"
        }
    });
    let mock = MockProvider::new(StatusCode::UNAUTHORIZED, reply);
    let docs = adapter(serve(mock.clone()).await);

    let err = docs.generate_documentation("x = 1").await.unwrap_err();

    assert_eq!(err, PortError::Provider("Invalid API key".to_string()));
    assert_eq!(mock.requests().len(), 1);
}

#[tokio::test]
async fn unreachable_provider_is_a_provider_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let api_base = format!("http://{}/v1", listener.local_addr().unwrap());
    drop(listener);
    let docs = adapter(api_base);

    let err = docs.generate_documentation("x = 1").await.unwrap_err();

    assert!(matches!(err, PortError::Provider(msg) if !msg.is_empty()));
}

#[tokio::test]
async fn file_upload_flows_through_to_the_provider() {
    let mock = MockProvider::new(StatusCode::OK, completion(json!("# hi")));
    let docs = Arc::new(adapter(serve(mock.clone()).await));
    let app = app_router(Arc::new(AppState::new(docs)));

    let boundary = "b0undary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"hi.py\"\r\n\r\nprint('hi')\r\n--{boundary}--\r\n"
    );
    let response = app
        .clone()
        .oneshot(
            Request::post("/documentation/upload")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let response = app
        .oneshot(
            Request::post("/documentation")
                .header(header::COOKIE, cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let view: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(view["documentation"]["markdown"], "# hi");

    let requests = mock.requests();
    let user_message = requests[0]["messages"][1]["content"].as_str().unwrap();
    assert!(user_message.contains("print('hi')"));
}
