//! Lifecycle of one competition request
//!
//! ```text
//! Submitted → AwaitingResult → Resolved | Failed
//! Submitted → Failed
//! ```
//!
//! Every transition is checked and recorded so a run's history can be
//! inspected after the fact.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::conversation::ExchangeHandle;

/// States of a competition run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionState {
    /// Exchange opened, request not yet sent
    Submitted,
    /// Request in flight
    AwaitingResult,
    /// Result folded into statistics and log
    Resolved,
    /// Transport, malformed, or backend-reported failure
    Failed,
}

impl CompetitionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Failed)
    }
}

impl fmt::Display for CompetitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submitted => write!(f, "Submitted"),
            Self::AwaitingResult => write!(f, "AwaitingResult"),
            Self::Resolved => write!(f, "Resolved"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

fn is_legal_transition(from: CompetitionState, to: CompetitionState) -> bool {
    use CompetitionState::*;

    if to == Failed && !from.is_terminal() {
        return true;
    }

    matches!((from, to), (Submitted, AwaitingResult) | (AwaitingResult, Resolved))
}

/// A single recorded transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: CompetitionState,
    pub to: CompetitionState,
    /// Milliseconds since the run was created
    pub elapsed_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Returned when a run is moved along an edge that does not exist
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Illegal competition transition: {from} → {to}")]
pub struct TransitionError {
    pub from: CompetitionState,
    pub to: CompetitionState,
}

/// One submitted competition and its history
#[derive(Debug, Clone)]
pub struct CompetitionRun {
    id: Uuid,
    handle: ExchangeHandle,
    current: CompetitionState,
    created_at: Instant,
    transitions: Vec<TransitionRecord>,
}

impl CompetitionRun {
    pub fn new(handle: ExchangeHandle) -> Self {
        Self {
            id: Uuid::new_v4(),
            handle,
            current: CompetitionState::Submitted,
            created_at: Instant::now(),
            transitions: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn handle(&self) -> ExchangeHandle {
        self.handle
    }

    pub fn state(&self) -> CompetitionState {
        self.current
    }

    pub fn is_terminal(&self) -> bool {
        self.current.is_terminal()
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    /// Move to `to` if the edge exists.
    pub fn advance(
        &mut self,
        to: CompetitionState,
        reason: Option<&str>,
    ) -> Result<(), TransitionError> {
        if !is_legal_transition(self.current, to) {
            return Err(TransitionError {
                from: self.current,
                to,
            });
        }

        tracing::debug!(
            run = %self.id,
            handle = %self.handle,
            from = %self.current,
            to = %to,
            "Competition transition"
        );

        self.transitions.push(TransitionRecord {
            from: self.current,
            to,
            elapsed_ms: self.created_at.elapsed().as_millis() as u64,
            reason: reason.map(String::from),
        });
        self.current = to;
        Ok(())
    }

    pub fn fail(&mut self, reason: &str) -> Result<(), TransitionError> {
        self.advance(CompetitionState::Failed, Some(reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut run = CompetitionRun::new(ExchangeHandle(0));
        assert_eq!(run.state(), CompetitionState::Submitted);

        run.advance(CompetitionState::AwaitingResult, None).unwrap();
        run.advance(CompetitionState::Resolved, Some("winner: compliance"))
            .unwrap();

        assert!(run.is_terminal());
        assert_eq!(run.transitions().len(), 2);
        assert_eq!(
            run.transitions()[1].reason.as_deref(),
            Some("winner: compliance")
        );
    }

    #[test]
    fn test_fail_before_and_after_sending() {
        let mut early = CompetitionRun::new(ExchangeHandle(1));
        early.fail("cancelled").unwrap();
        assert_eq!(early.state(), CompetitionState::Failed);

        let mut late = CompetitionRun::new(ExchangeHandle(2));
        late.advance(CompetitionState::AwaitingResult, None).unwrap();
        late.fail("HTTP 500").unwrap();
        assert_eq!(late.state(), CompetitionState::Failed);
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut run = CompetitionRun::new(ExchangeHandle(3));
        run.advance(CompetitionState::AwaitingResult, None).unwrap();
        run.advance(CompetitionState::Resolved, None).unwrap();

        let err = run.fail("late").unwrap_err();
        assert_eq!(err.from, CompetitionState::Resolved);
        assert_eq!(err.to, CompetitionState::Failed);
    }

    #[test]
    fn test_cannot_skip_request() {
        let mut run = CompetitionRun::new(ExchangeHandle(4));
        assert!(run.advance(CompetitionState::Resolved, None).is_err());
        assert_eq!(run.state(), CompetitionState::Submitted);
    }

    #[test]
    fn test_runs_get_distinct_ids() {
        let a = CompetitionRun::new(ExchangeHandle(5));
        let b = CompetitionRun::new(ExchangeHandle(5));
        assert_ne!(a.id(), b.id());
    }
}
