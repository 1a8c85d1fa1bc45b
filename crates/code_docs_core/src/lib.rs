pub mod controller;
pub mod domain;
pub mod export;
pub mod ports;

pub use controller::{ControllerError, ControllerState, InteractionController, SubmitOutcome};
pub use domain::{DocumentationResult, RequestState, SourceCode, SourceOrigin};
pub use export::ExportArtifact;
pub use ports::{DocumentationService, PortError, PortResult};
