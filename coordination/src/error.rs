//! Error taxonomy shared by every panel component

use thiserror::Error;

/// Errors surfaced by panel components.
///
/// Which of these reach the user, and how, is decided by the caller:
/// refresh failures are swallowed, query failures become system notices,
/// training failures stay on the certification affordance.
#[derive(Debug, Clone, Error)]
pub enum PanelError {
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Training failed: {0}")]
    TrainingFailure(String),

    #[error("Unknown agent: {0}")]
    InvalidAgent(String),
}

/// Result type for panel operations
pub type PanelResult<T> = Result<T, PanelError>;

impl PanelError {
    /// Human-readable text for a failed query or competition.
    pub fn user_message(&self) -> String {
        match self {
            PanelError::TransportFailure(_) => {
                "Failed to get a response. Please try again.".to_string()
            }
            PanelError::MalformedResponse(_) => {
                "Received an unexpected response. Please try again.".to_string()
            }
            PanelError::TrainingFailure(reason) => format!("Training failed: {}", reason),
            PanelError::InvalidAgent(agent) => format!("Unknown agent '{}'.", agent),
        }
    }
}
