//! Backend contract
//!
//! The inference/training service is an external collaborator. This module
//! fixes the request/response shapes the client depends on and the trait
//! the host implements (over HTTP in production, in-process in tests).
//!
//! Reply types keep every field optional: shape validation belongs to the
//! component that folds the reply in, so a reply that deserializes but is
//! semantically incomplete is still rejected wholesale there.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agents::{AgentId, RosterEntry};
use crate::error::PanelError;

/// Errors from a backend round trip
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Could not decode response: {0}")]
    Malformed(String),
}

/// Result type for backend calls
pub type BackendResult<T> = Result<T, BackendError>;

impl From<BackendError> for PanelError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Transport(_) | BackendError::Status { .. } => {
                PanelError::TransportFailure(err.to_string())
            }
            BackendError::Malformed(msg) => PanelError::MalformedResponse(msg),
        }
    }
}

// =========================================================================
// Training
// =========================================================================

/// One agent's entry in `GET /api/training/status`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    #[serde(default)]
    pub certified: bool,
    #[serde(default)]
    pub final_score: Option<f64>,
    /// Older servers report the score under this key
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub certification_date: Option<String>,
    #[serde(default)]
    pub training_in_progress: Option<bool>,
    #[serde(default)]
    pub progress: Option<f64>,
}

impl StatusEntry {
    /// `final_score`, falling back to `score`
    pub fn reported_score(&self) -> Option<f64> {
        self.final_score.or(self.score)
    }
}

/// Full status payload, keyed by wire agent id
pub type StatusPayload = HashMap<String, StatusEntry>;

/// Body of `POST /api/training/train`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainRequest {
    pub agent_id: AgentId,
    pub force_retrain: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainDetails {
    #[serde(default)]
    pub final_score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainReply {
    #[serde(default)]
    pub details: Option<TrainDetails>,
    #[serde(default)]
    pub error: Option<String>,
}

// =========================================================================
// Queries
// =========================================================================

/// Body of `POST /api/query`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub agent: AgentId,
}

/// One member of a panel reply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelEntryReply {
    pub agent: String,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub accuracy: Option<String>,
    #[serde(default)]
    pub certified: Option<bool>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Reply of `POST /api/query`: exactly one of `error`, `responses`,
/// `response` is expected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryReply {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub responses: Option<Vec<PanelEntryReply>>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub accuracy: Option<String>,
    #[serde(default)]
    pub certified: Option<bool>,
    #[serde(default)]
    pub provider: Option<String>,
}

// =========================================================================
// Competition
// =========================================================================

/// Body of `POST /api/compete`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompeteRequest {
    pub query: String,
}

/// Reply of `POST /api/compete`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompeteReply {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default)]
    pub winning_response: Option<String>,
    #[serde(default)]
    pub winning_time: Option<f64>,
    #[serde(default)]
    pub winning_provider: Option<String>,
    #[serde(default)]
    pub analyses: Option<HashMap<String, String>>,
    #[serde(default)]
    pub correction_needed: Option<bool>,
    #[serde(default)]
    pub correction_winner: Option<String>,
    #[serde(default)]
    pub correction_response: Option<String>,
}

/// Reply of `GET /api/agents`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentsReply {
    #[serde(default)]
    pub agents: Vec<RosterEntry>,
}

// =========================================================================
// Trait
// =========================================================================

/// The backend inference/training service.
#[async_trait]
pub trait PanelBackend: Send + Sync {
    /// `GET /api/training/status`
    async fn training_status(&self) -> BackendResult<StatusPayload>;

    /// `POST /api/training/train`
    async fn train(&self, request: &TrainRequest) -> BackendResult<TrainReply>;

    /// `POST /api/query`
    async fn query(&self, request: &QueryRequest) -> BackendResult<QueryReply>;

    /// `POST /api/compete`
    async fn compete(&self, request: &CompeteRequest) -> BackendResult<CompeteReply>;

    /// `GET /api/agents`
    async fn agents(&self) -> BackendResult<AgentsReply>;
}

/// Shared reference to a backend
pub type SharedBackend = Arc<dyn PanelBackend>;
