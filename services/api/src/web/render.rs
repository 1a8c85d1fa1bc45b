//! services/api/src/web/render.rs
//!
//! Turns the provider's markdown into HTML for display. The markdown itself is
//! never modified; export always hands back the original text.

use pulldown_cmark::{html, Event, Options, Parser};

pub fn render_markdown(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;

    // Raw HTML from the model is shown as text, not injected into the page.
    let events = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut rendered = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut rendered, events);
    rendered
}
