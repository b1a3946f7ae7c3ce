//! Dialogue coordination for loan application intake
//!
//! Ties the field extractor, the stage machine and the external decision
//! services together into a turn-based conversation loop.

pub mod coordinator;
pub mod prompts;
pub mod session;
pub mod stage;

pub use coordinator::IntakeCoordinator;
pub use session::SessionState;
pub use stage::IntakeStage;

use thiserror::Error;

/// Errors the coordinator can surface to its caller
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid stage transition from {from:?} to {to:?}")]
    InvalidTransition { from: IntakeStage, to: IntakeStage },

    /// Email stage entered without a stored decision
    #[error("decision data missing before email dispatch")]
    MissingDecision,

    #[error(transparent)]
    Service(#[from] loan_agent_core::ServiceError),
}
