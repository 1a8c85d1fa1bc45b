//! services/api/src/web/page.rs
//!
//! Serves the single browser page. All behavior lives behind the JSON
//! endpoints; the page only draws the `DocumentationView` it gets back.

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../static/index.html");

pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}
