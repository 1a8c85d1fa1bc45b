//! services/api/src/web/middleware.rs
//!
//! Session middleware: ties every request to the controller of its browser
//! session through a cookie.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::web::state::AppState;

pub const SESSION_COOKIE: &str = "docs_session";

/// Middleware that looks up (or starts) the caller's session.
///
/// The session handle is inserted into request extensions for handlers to use.
/// A `Set-Cookie` header is added whenever a new session had to be created.
pub async fn attach_session(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    // 1. Extract the session id from the cookie header, if any
    let existing = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(session_id_from_cookies);

    // 2. Resolve it to a controller
    let (handle, created) = state.sessions.get_or_create(existing).await;
    let session_id = handle.session_id;

    // 3. Insert the handle into request extensions and run the handler
    req.extensions_mut().insert(handle);
    let mut response = next.run(req).await;

    // 4. Hand a new session's cookie back to the browser
    if created {
        let cookie = format!("{}={}; HttpOnly; SameSite=Lax; Path=/", SESSION_COOKIE, session_id);
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => error!("Failed to build session cookie: {:?}", e),
        }
    }

    response
}

/// Finds `docs_session=<uuid>` in a `Cookie` header value.
pub fn session_id_from_cookies(cookie_header: &str) -> Option<Uuid> {
    cookie_header.split(';').find_map(|c| {
        c.trim()
            .strip_prefix(SESSION_COOKIE)
            .and_then(|rest| rest.strip_prefix('='))
            .and_then(|id| Uuid::parse_str(id.trim()).ok())
    })
}
