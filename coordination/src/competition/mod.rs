//! Competition mode
//!
//! Several agents answer the same query; the backend picks the fastest
//! accurate reply and optionally a correction. The engine folds each
//! result into process-wide statistics that the leaderboard projects.
//!
//! ```text
//! submit ──▶ /api/compete ──▶ validate ──▶ fold (stats + log) ──▶ events
//!                                 │
//!                                 └──▶ reject (notice only)
//! ```

pub mod engine;
pub mod result;
pub mod run;
pub mod stats;

pub use engine::{CompetitionEngine, SharedCompetitionEngine};
pub use result::{CompetitionOutcome, CompetitionVerdict};
pub use run::{CompetitionRun, CompetitionState, TransitionError, TransitionRecord};
pub use stats::{AgentTally, CompetitionStatistics};
