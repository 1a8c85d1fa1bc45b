//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{
    protocol::{
        DocumentationPayload, DocumentationView, RequestStatus, SourceRequest, SourceView,
        SubmitRequest,
    },
    state::SessionHandle,
};
use axum::{
    extract::Multipart,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use code_docs_core::{ControllerError, ExportArtifact, SubmitOutcome};
use tracing::{error, info, warn};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(utoipa::OpenApi)]
#[openapi(
    paths(
        get_documentation_handler,
        update_source_handler,
        upload_source_handler,
        submit_handler,
        export_handler,
    ),
    components(
        schemas(
            DocumentationView,
            DocumentationPayload,
            SourceView,
            RequestStatus,
            SourceRequest,
            SubmitRequest
        )
    ),
    tags(
        (name = "Code Docs API", description = "Turns source code into markdown documentation.")
    )
)]
pub struct ApiDoc;

async fn current_view(session: &SessionHandle) -> DocumentationView {
    DocumentationView::from(&session.controller.snapshot().await)
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Current state of this browser session.
#[utoipa::path(
    get,
    path = "/documentation",
    responses(
        (status = 200, description = "The session's current view", body = DocumentationView)
    )
)]
pub async fn get_documentation_handler(
    Extension(session): Extension<SessionHandle>,
) -> Json<DocumentationView> {
    Json(current_view(&session).await)
}

/// Replace the source buffer with typed text.
#[utoipa::path(
    put,
    path = "/documentation/source",
    request_body = SourceRequest,
    responses(
        (status = 200, description = "Buffer replaced", body = DocumentationView)
    )
)]
pub async fn update_source_handler(
    Extension(session): Extension<SessionHandle>,
    Json(req): Json<SourceRequest>,
) -> Json<DocumentationView> {
    session.controller.set_source(req.code).await;
    Json(current_view(&session).await)
}

/// Replace the source buffer with the contents of an uploaded file.
///
/// Accepts a multipart/form-data request with a single file part.
#[utoipa::path(
    post,
    path = "/documentation/upload",
    request_body(content_type = "multipart/form-data", description = "The source file to document."),
    responses(
        (status = 200, description = "File loaded into the buffer", body = DocumentationView),
        (status = 400, description = "Missing file or file is not UTF-8 text")
    )
)]
pub async fn upload_source_handler(
    Extension(session): Extension<SessionHandle>,
    mut multipart: Multipart,
) -> Result<Json<DocumentationView>, (StatusCode, String)> {
    let (file_name, bytes) = if let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        let name = field.file_name().unwrap_or("untitled.txt").to_string();
        let data = field.bytes().await.map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("Failed to read file bytes: {}", e),
            )
        })?;
        (name, data.to_vec())
    } else {
        return Err((
            StatusCode::BAD_REQUEST,
            "Multipart form must include a file".to_string(),
        ));
    };

    session
        .controller
        .load_from_file(&file_name, bytes)
        .await
        .map_err(|e| {
            warn!("Rejected upload for session {}: {}", session.session_id, e);
            (StatusCode::BAD_REQUEST, e.to_string())
        })?;

    Ok(Json(current_view(&session).await))
}

/// Generate documentation for the buffer (or for `code`, when given).
#[utoipa::path(
    post,
    path = "/documentation",
    request_body = SubmitRequest,
    responses(
        (status = 200, description = "Documentation generated", body = DocumentationView),
        (status = 409, description = "A request is already in flight", body = DocumentationView),
        (status = 422, description = "The buffer is empty", body = DocumentationView),
        (status = 502, description = "The provider call failed", body = DocumentationView)
    )
)]
pub async fn submit_handler(
    Extension(session): Extension<SessionHandle>,
    Json(req): Json<SubmitRequest>,
) -> impl IntoResponse {
    if let Some(code) = req.code {
        session.controller.set_source(code).await;
    }

    let outcome = session.controller.submit().await;
    info!("Session {} submit finished: {:?}", session.session_id, outcome);

    let status = match outcome {
        SubmitOutcome::Succeeded => StatusCode::OK,
        SubmitOutcome::Rejected => StatusCode::UNPROCESSABLE_ENTITY,
        SubmitOutcome::Busy => StatusCode::CONFLICT,
        SubmitOutcome::Failed => StatusCode::BAD_GATEWAY,
    };
    (status, Json(current_view(&session).await))
}

/// Download the latest documentation as `documentation-<YYYY-MM-DD>.md`.
#[utoipa::path(
    get,
    path = "/documentation/export",
    responses(
        (status = 200, description = "The markdown file", body = String, content_type = "text/markdown"),
        (status = 404, description = "Nothing has been generated yet"),
        (status = 409, description = "A request is still in flight")
    )
)]
pub async fn export_handler(
    Extension(session): Extension<SessionHandle>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let artifact = session
        .controller
        .export_result_today()
        .await
        .map_err(|e| {
            let status = match e {
                ControllerError::NothingToExport => StatusCode::NOT_FOUND,
                ControllerError::RequestInFlight => StatusCode::CONFLICT,
                ControllerError::InvalidEncoding { .. } => {
                    error!("Unexpected export error: {:?}", e);
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            (status, e.to_string())
        })?;

    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, ExportArtifact::MEDIA_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.content,
    ))
}
