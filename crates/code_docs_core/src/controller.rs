//! crates/code_docs_core/src/controller.rs
//!
//! The interaction controller: owns the source buffer, the request state, the
//! latest documentation result and the current error message, and drives the
//! idle -> submitting -> succeeded/failed state machine.

use crate::domain::{
    has_accepted_extension, DocumentationResult, RequestState, SourceCode, ACCEPTED_EXTENSIONS,
};
use crate::export::ExportArtifact;
use crate::ports::DocumentationService;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Shown when submit is pressed with nothing but whitespace in the buffer.
pub const EMPTY_INPUT_MESSAGE: &str = "Please enter some code";

/// Errors from controller operations that never reach the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error("File '{file_name}' is not valid UTF-8 text")]
    InvalidEncoding { file_name: String },
    #[error("There is no documentation to export yet")]
    NothingToExport,
    #[error("Documentation is still being generated")]
    RequestInFlight,
}

/// What a call to [`InteractionController::submit`] ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The provider returned documentation.
    Succeeded,
    /// The provider call failed; the error message is set.
    Failed,
    /// The buffer was blank; no request was issued.
    Rejected,
    /// A request was already in flight; nothing happened.
    Busy,
}

/// A copy of everything the page needs to draw itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerState {
    pub source: SourceCode,
    pub request_state: RequestState,
    pub result: Option<DocumentationResult>,
    pub error: Option<String>,
}

impl ControllerState {
    /// The held result is authoritative only after a success with no error
    /// raised since.
    pub fn result_is_current(&self) -> bool {
        self.request_state == RequestState::Succeeded
            && self.error.is_none()
            && self.result.is_some()
    }
}

//=========================================================================================
// InteractionController
//=========================================================================================

pub struct InteractionController {
    docs: Arc<dyn DocumentationService>,
    state: Mutex<ControllerState>,
}

impl InteractionController {
    pub fn new(docs: Arc<dyn DocumentationService>) -> Self {
        Self {
            docs,
            state: Mutex::new(ControllerState::default()),
        }
    }

    pub async fn snapshot(&self) -> ControllerState {
        self.state.lock().await.clone()
    }

    /// Replaces the buffer with text typed by the user.
    pub async fn set_source(&self, text: String) {
        self.state.lock().await.source = SourceCode::typed(text);
    }

    /// Replaces the buffer with the full text of an uploaded file.
    ///
    /// The extension list is a hint for the picker; other files are accepted.
    pub async fn load_from_file(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<(), ControllerError> {
        if !has_accepted_extension(file_name) {
            warn!(
                "Loading '{}' although its extension is not one of {:?}",
                file_name, ACCEPTED_EXTENSIONS
            );
        }
        let text = String::from_utf8(bytes).map_err(|_| ControllerError::InvalidEncoding {
            file_name: file_name.to_string(),
        })?;
        info!("Loaded {} bytes of source from '{}'", text.len(), file_name);

        self.state.lock().await.source = SourceCode::from_file(file_name, text);
        Ok(())
    }

    /// Sends the current buffer to the documentation service.
    ///
    /// The state lock is released while the provider call is pending, so the
    /// buffer and the snapshot stay available to other requests.
    pub async fn submit(&self) -> SubmitOutcome {
        let code = {
            let mut state = self.state.lock().await;
            if state.request_state == RequestState::Submitting {
                info!("Submit ignored: a request is already in flight.");
                return SubmitOutcome::Busy;
            }
            if state.source.is_blank() {
                state.error = Some(EMPTY_INPUT_MESSAGE.to_string());
                return SubmitOutcome::Rejected;
            }
            state.error = None;
            state.request_state = RequestState::Submitting;
            state.source.text.clone()
        };

        let start_time = Instant::now();
        info!("Requesting documentation for {} bytes of source.", code.len());
        let outcome = self.docs.generate_documentation(&code).await;

        let mut state = self.state.lock().await;
        match outcome {
            Ok(markdown) => {
                info!(
                    "⏱️ Documentation generated in {:?} ({} bytes).",
                    start_time.elapsed(),
                    markdown.len()
                );
                state.result = Some(DocumentationResult::new(markdown));
                state.request_state = RequestState::Succeeded;
                SubmitOutcome::Succeeded
            }
            Err(e) => {
                warn!(
                    "Documentation request failed after {:?}: {}",
                    start_time.elapsed(),
                    e
                );
                state.error = Some(format!("Error: {}", e));
                state.request_state = RequestState::Failed;
                SubmitOutcome::Failed
            }
        }
    }

    /// Packages the latest result as `documentation-<date>.md`.
    pub async fn export_result(&self, date: NaiveDate) -> Result<ExportArtifact, ControllerError> {
        let state = self.state.lock().await;
        if state.request_state == RequestState::Submitting {
            return Err(ControllerError::RequestInFlight);
        }
        let result = state
            .result
            .as_ref()
            .ok_or(ControllerError::NothingToExport)?;
        Ok(ExportArtifact::new(&result.markdown, date))
    }

    pub async fn export_result_today(&self) -> Result<ExportArtifact, ControllerError> {
        self.export_result(Utc::now().date_naive()).await
    }
}
