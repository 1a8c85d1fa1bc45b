pub mod middleware;
pub mod page;
pub mod protocol;
pub mod render;
pub mod rest;
pub mod state;

pub use middleware::attach_session;
pub use rest::{
    export_handler, get_documentation_handler, submit_handler, update_source_handler,
    upload_source_handler,
};

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use state::AppState;
use std::sync::Arc;

/// Uploads larger than this are refused before they reach the controller.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Builds the page and documentation routes, all behind the session middleware.
pub fn app_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(page::index_handler))
        .route(
            "/documentation",
            get(get_documentation_handler).post(submit_handler),
        )
        .route("/documentation/source", put(update_source_handler))
        .route("/documentation/upload", post(upload_source_handler))
        .route("/documentation/export", get(export_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            attach_session,
        ))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(app_state)
}
