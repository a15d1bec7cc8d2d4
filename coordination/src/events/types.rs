//! Event types for panel state changes
//!
//! Presentation adapters subscribe to these to know when a derived view
//! needs re-rendering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agents::AgentId;
use crate::conversation::{ExchangeHandle, ExchangeKind};

/// All panel state-change events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PanelEvent {
    /// Certification records were replaced by a fresh payload
    CertificationsRefreshed {
        agents: usize,
        timestamp: DateTime<Utc>,
    },

    /// A certification refresh failed; prior state was kept
    CertificationRefreshFailed {
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// A training request was issued (optimistic display)
    TrainingStarted {
        agent: AgentId,
        timestamp: DateTime<Utc>,
    },

    /// The backend reported a completed training run
    TrainingCompleted {
        agent: AgentId,
        score: f64,
        timestamp: DateTime<Utc>,
    },

    /// Training could not be completed
    TrainingFailed {
        agent: AgentId,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// The active agent changed
    SelectionChanged {
        agent: AgentId,
        timestamp: DateTime<Utc>,
    },

    /// Competition mode was switched on or off
    ModeChanged {
        competition: bool,
        timestamp: DateTime<Utc>,
    },

    /// An exchange was appended at the log tail
    ExchangeAppended {
        handle: Option<ExchangeHandle>,
        kind: ExchangeKind,
        timestamp: DateTime<Utc>,
    },

    /// A pending placeholder was replaced in place
    ExchangeResolved {
        handle: ExchangeHandle,
        kind: ExchangeKind,
        timestamp: DateTime<Utc>,
    },

    /// A competition query left for the backend
    CompetitionSubmitted {
        handle: ExchangeHandle,
        run_id: String,
        timestamp: DateTime<Utc>,
    },

    /// A competition result was folded into the statistics
    CompetitionResolved {
        handle: ExchangeHandle,
        winner: AgentId,
        correction_winner: Option<AgentId>,
        timestamp: DateTime<Utc>,
    },

    /// A competition query failed without touching the statistics
    CompetitionFailed {
        handle: ExchangeHandle,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Competition statistics changed; leaderboard views are stale
    StatisticsChanged {
        total_competitions: u64,
        timestamp: DateTime<Utc>,
    },
}

impl PanelEvent {
    /// Get the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            PanelEvent::CertificationsRefreshed { timestamp, .. } => *timestamp,
            PanelEvent::CertificationRefreshFailed { timestamp, .. } => *timestamp,
            PanelEvent::TrainingStarted { timestamp, .. } => *timestamp,
            PanelEvent::TrainingCompleted { timestamp, .. } => *timestamp,
            PanelEvent::TrainingFailed { timestamp, .. } => *timestamp,
            PanelEvent::SelectionChanged { timestamp, .. } => *timestamp,
            PanelEvent::ModeChanged { timestamp, .. } => *timestamp,
            PanelEvent::ExchangeAppended { timestamp, .. } => *timestamp,
            PanelEvent::ExchangeResolved { timestamp, .. } => *timestamp,
            PanelEvent::CompetitionSubmitted { timestamp, .. } => *timestamp,
            PanelEvent::CompetitionResolved { timestamp, .. } => *timestamp,
            PanelEvent::CompetitionFailed { timestamp, .. } => *timestamp,
            PanelEvent::StatisticsChanged { timestamp, .. } => *timestamp,
        }
    }

    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            PanelEvent::CertificationsRefreshed { .. } => "certifications_refreshed",
            PanelEvent::CertificationRefreshFailed { .. } => "certification_refresh_failed",
            PanelEvent::TrainingStarted { .. } => "training_started",
            PanelEvent::TrainingCompleted { .. } => "training_completed",
            PanelEvent::TrainingFailed { .. } => "training_failed",
            PanelEvent::SelectionChanged { .. } => "selection_changed",
            PanelEvent::ModeChanged { .. } => "mode_changed",
            PanelEvent::ExchangeAppended { .. } => "exchange_appended",
            PanelEvent::ExchangeResolved { .. } => "exchange_resolved",
            PanelEvent::CompetitionSubmitted { .. } => "competition_submitted",
            PanelEvent::CompetitionResolved { .. } => "competition_resolved",
            PanelEvent::CompetitionFailed { .. } => "competition_failed",
            PanelEvent::StatisticsChanged { .. } => "statistics_changed",
        }
    }

    /// Get the agent if this event is agent-scoped
    pub fn agent(&self) -> Option<AgentId> {
        match self {
            PanelEvent::TrainingStarted { agent, .. } => Some(*agent),
            PanelEvent::TrainingCompleted { agent, .. } => Some(*agent),
            PanelEvent::TrainingFailed { agent, .. } => Some(*agent),
            PanelEvent::SelectionChanged { agent, .. } => Some(*agent),
            PanelEvent::CompetitionResolved { winner, .. } => Some(*winner),
            _ => None,
        }
    }

    /// Get the exchange handle if this event is log-scoped
    pub fn handle(&self) -> Option<ExchangeHandle> {
        match self {
            PanelEvent::ExchangeAppended { handle, .. } => *handle,
            PanelEvent::ExchangeResolved { handle, .. } => Some(*handle),
            PanelEvent::CompetitionSubmitted { handle, .. } => Some(*handle),
            PanelEvent::CompetitionResolved { handle, .. } => Some(*handle),
            PanelEvent::CompetitionFailed { handle, .. } => Some(*handle),
            _ => None,
        }
    }
}
