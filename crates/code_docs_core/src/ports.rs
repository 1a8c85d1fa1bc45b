//! crates/code_docs_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! The controller only ever talks to the inference provider through these
//! traits, so it stays independent of any concrete HTTP client.

use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    /// Transport failure or non-success status from the provider. Carries the
    /// provider's own message when it sent a structured one.
    #[error("{0}")]
    Provider(String),
    /// The provider answered, but there was no usable content in the answer.
    #[error("No documentation generated")]
    EmptyResponse,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DocumentationService: Send + Sync {
    /// Generates markdown documentation for a piece of source code.
    ///
    /// Callers must not pass blank input; implementations do not re-check it.
    async fn generate_documentation(&self, code: &str) -> PortResult<String>;
}
