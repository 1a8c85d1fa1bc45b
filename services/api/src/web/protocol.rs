//! services/api/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between the browser page and the API
//! server. The page redraws itself entirely from a `DocumentationView`.

use crate::web::render::render_markdown;
use chrono::{DateTime, Utc};
use code_docs_core::{ControllerState, RequestState, SourceOrigin};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// Typed source code replacing the current buffer.
#[derive(Deserialize, Debug, ToSchema)]
pub struct SourceRequest {
    pub code: String,
}

/// Starts a generation. When `code` is present it replaces the buffer first.
#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct SubmitRequest {
    #[serde(default)]
    pub code: Option<String>,
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

impl From<RequestState> for RequestStatus {
    fn from(state: RequestState) -> Self {
        match state {
            RequestState::Idle => Self::Idle,
            RequestState::Submitting => Self::Submitting,
            RequestState::Succeeded => Self::Succeeded,
            RequestState::Failed => Self::Failed,
        }
    }
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct SourceView {
    pub text: String,
    /// `typed` or `file`.
    pub origin: String,
    pub file_name: Option<String>,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct DocumentationPayload {
    /// The provider's answer, verbatim.
    pub markdown: String,
    /// `markdown` rendered for display.
    pub html: String,
    pub generated_at: DateTime<Utc>,
}

/// Everything the page shows for one browser session.
#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct DocumentationView {
    pub state: RequestStatus,
    pub source: SourceView,
    pub error: Option<String>,
    pub documentation: Option<DocumentationPayload>,
    /// False when `documentation` is left over from an earlier attempt.
    pub result_is_current: bool,
}

impl From<&ControllerState> for DocumentationView {
    fn from(state: &ControllerState) -> Self {
        let (origin, file_name) = match &state.source.origin {
            SourceOrigin::Typed => ("typed", None),
            SourceOrigin::File { file_name } => ("file", Some(file_name.clone())),
        };
        Self {
            state: state.request_state.into(),
            source: SourceView {
                text: state.source.text.clone(),
                origin: origin.to_string(),
                file_name,
            },
            error: state.error.clone(),
            documentation: state.result.as_ref().map(|result| DocumentationPayload {
                html: render_markdown(&result.markdown),
                markdown: result.markdown.clone(),
                generated_at: result.generated_at,
            }),
            result_is_current: state.result_is_current(),
        }
    }
}
