//! Expert Panel Client Core
//!
//! State synchronisation and competition scoring for a chat client that
//! talks to a panel of specialist agents:
//! - Certification state pulled from the backend, with optimistic training
//! - Active agent selection
//! - A conversation log that keeps submission order under reordered replies
//! - Competition mode: fold race results into running statistics
//! - Leaderboard and dashboard projections
//!
//! # Components
//!
//! ```text
//!  user action / timer
//!          │
//!          ▼
//! ┌─────────────────┐   ┌──────────────────┐   ┌───────────────────┐
//! │ SelectionContext│   │CertificationStore│   │    AppContext     │
//! └─────────────────┘   └──────────────────┘   └─────────┬─────────┘
//!                                                        │
//!                       ┌────────────────────────────────┼──────────┐
//!                       ▼                                ▼          │
//!             ┌──────────────────┐             ┌─────────────────┐  │
//!             │ CompetitionEngine│             │ QueryDispatcher │  │
//!             └────────┬─────────┘             └────────┬────────┘  │
//!                      │  fold-in                       │ resolve   │
//!                      ▼                                ▼           │
//!             ┌──────────────────┐             ┌─────────────────┐  │
//!             │ Statistics ──▶   │             │ ConversationLog │◀─┘
//!             │ Leaderboard      │             └─────────────────┘
//!             └──────────────────┘
//! ```
//!
//! Every committed change is announced on the [`EventBus`] so presentation
//! adapters know when to re-render.
//!
//! # Usage
//!
//! ```ignore
//! let ctx = AppContext::new(backend).shared();
//! ctx.refresh_certifications().await;
//! ctx.select(AgentId::Compliance);
//! let handle = ctx.submit_message("What does IPMDAR require?");
//! ctx.wait_idle().await;
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod agents;
pub mod backend;
pub mod certification;
pub mod competition;
pub mod context;
pub mod conversation;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod leaderboard;
pub mod selection;

// Re-export key agent types
pub use agents::{AgentId, AgentProfile, AgentRoster, RosterEntry};

// Re-export backend contract
pub use backend::{
    AgentsReply, BackendError, BackendResult, CompeteReply, CompeteRequest, PanelBackend,
    PanelEntryReply, QueryReply, QueryRequest, SharedBackend, StatusEntry, StatusPayload,
    TrainDetails, TrainReply, TrainRequest,
};

// Re-export certification types
pub use certification::{
    BadgeState, CertificationDetail, CertificationRecord, CertificationStore, TrainingAction,
    TrainingDisplay,
};

// Re-export competition types
pub use competition::{
    AgentTally, CompetitionEngine, CompetitionOutcome, CompetitionRun, CompetitionState,
    CompetitionStatistics, CompetitionVerdict, TransitionError,
};

// Re-export application context
pub use context::{AppContext, SharedAppContext};

// Re-export conversation types
pub use conversation::{
    AgentReply, Analysis, CompetitionExchange, Conversation, ConversationLog, Correction,
    Exchange, ExchangeHandle, ExchangeKind, LogEntry, LogError, Slot,
};

// Re-export dispatch types
pub use dispatch::{QueryDispatcher, QueryVerdict};

// Re-export error taxonomy
pub use error::{PanelError, PanelResult};

// Re-export event types
pub use events::{EventBus, EventFilter, FilteredReceiver, PanelEvent, SharedEventBus};

// Re-export projections
pub use leaderboard::{ChartPoint, LeaderboardProjector, LeaderboardRow};

// Re-export selection
pub use selection::{SelectionContext, SharedSelection};
