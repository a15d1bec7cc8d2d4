//! Competition engine
//!
//! Submission returns a handle at once; the backend round trip and the
//! fold-in run on a tracked task. The fold-in holds the statistics lock
//! from validation result to log resolution, so two results never
//! interleave and a rejected reply never reaches the counters.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use super::result::{CompetitionOutcome, CompetitionVerdict};
use super::run::{CompetitionRun, CompetitionState};
use super::stats::CompetitionStatistics;
use crate::agents::AgentId;
use crate::backend::{CompeteRequest, SharedBackend};
use crate::conversation::{CompetitionExchange, Exchange, ExchangeHandle, SharedConversation};
use crate::error::PanelError;
use crate::events::{PanelEvent, SharedEventBus};

/// Shared reference to CompetitionEngine
pub type SharedCompetitionEngine = Arc<CompetitionEngine>;

/// Title of the notice that replaces a failed competition's placeholder
const FAILURE_TITLE: &str = "Error";

/// Shown when a blank query is raced; nothing is sent
const EMPTY_QUERY_MESSAGE: &str = "No query provided";

/// Runs the competition protocol and owns the running statistics
pub struct CompetitionEngine {
    backend: SharedBackend,
    bus: SharedEventBus,
    conversation: SharedConversation,
    stats: Mutex<CompetitionStatistics>,
    runs: Mutex<HashMap<ExchangeHandle, CompetitionRun>>,
    tracker: TaskTracker,
}

impl CompetitionEngine {
    pub fn new(
        backend: SharedBackend,
        bus: SharedEventBus,
        conversation: SharedConversation,
        tracker: TaskTracker,
    ) -> Self {
        Self {
            backend,
            bus,
            conversation,
            stats: Mutex::new(CompetitionStatistics::new()),
            runs: Mutex::new(HashMap::new()),
            tracker,
        }
    }

    pub fn shared(self) -> SharedCompetitionEngine {
        Arc::new(self)
    }

    fn lock_stats(&self) -> MutexGuard<'_, CompetitionStatistics> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_runs(&self) -> MutexGuard<'_, HashMap<ExchangeHandle, CompetitionRun>> {
        self.runs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Open a new exchange for `query` and race the panel on it.
    pub fn submit(self: &Arc<Self>, query: impl Into<String>) -> ExchangeHandle {
        let query = query.into();
        let handle = self.conversation.open_exchange(query.clone(), AgentId::All);
        self.dispatch(handle, query);
        handle
    }

    /// Send `query` for an exchange whose placeholder is already in the log.
    pub fn dispatch(self: &Arc<Self>, handle: ExchangeHandle, query: String) {
        let run = CompetitionRun::new(handle);
        let run_id = run.id();
        self.lock_runs().insert(handle, run);

        info!(%handle, run = %run_id, "Competition submitted");
        self.bus.publish(PanelEvent::CompetitionSubmitted {
            handle,
            run_id: run_id.to_string(),
            timestamp: Utc::now(),
        });

        if query.trim().is_empty() {
            self.reject(handle, EMPTY_QUERY_MESSAGE.to_string(), "empty query".to_string());
            return;
        }

        let engine = Arc::clone(self);
        self.tracker.spawn(async move {
            engine.execute(handle, query).await;
        });
    }

    async fn execute(&self, handle: ExchangeHandle, query: String) {
        self.transition(handle, CompetitionState::AwaitingResult, None);

        let verdict = self
            .backend
            .compete(&CompeteRequest { query })
            .await
            .map_err(PanelError::from)
            .and_then(CompetitionVerdict::from_reply);

        match verdict {
            Ok(CompetitionVerdict::Decided(outcome)) => self.fold(handle, outcome),
            Ok(CompetitionVerdict::Rejected(message)) => {
                self.reject(handle, message.clone(), message)
            }
            Err(e) => self.reject(handle, e.user_message(), e.to_string()),
        }
    }

    // =========================================================================
    // Fold-in
    // =========================================================================

    /// Apply a validated result: statistics, log, then notifications.
    fn fold(&self, handle: ExchangeHandle, outcome: CompetitionOutcome) {
        let winner = outcome.winner;
        let correction_winner = outcome.correction.as_ref().map(|c| c.agent);
        let exchange = Exchange::CompetitionResult(CompetitionExchange::from(outcome.clone()));

        let total = {
            let mut stats = self.lock_stats();
            if let Err(e) = self.conversation.resolve(handle, exchange) {
                warn!(%handle, error = %e, "Discarding competition result");
                return;
            }
            stats.apply(&outcome);
            stats.total_competitions()
        };

        let reason = format!("winner: {}", winner);
        self.transition(handle, CompetitionState::Resolved, Some(&reason));
        info!(
            %handle,
            winner = %winner,
            time = outcome.winning_time,
            correction = ?correction_winner,
            total,
            "Competition result folded in"
        );

        self.bus.publish(PanelEvent::CompetitionResolved {
            handle,
            winner,
            correction_winner,
            timestamp: Utc::now(),
        });
        self.bus.publish(PanelEvent::StatisticsChanged {
            total_competitions: total,
            timestamp: Utc::now(),
        });
    }

    /// Resolve the placeholder with a notice; statistics stay untouched.
    fn reject(&self, handle: ExchangeHandle, message: String, reason: String) {
        warn!(%handle, reason = %reason, "Competition failed");
        if let Err(e) = self
            .conversation
            .resolve(handle, Exchange::notice(FAILURE_TITLE, message))
        {
            warn!(%handle, error = %e, "Discarding competition failure");
        }
        self.fail_run(handle, &reason);
        self.bus.publish(PanelEvent::CompetitionFailed {
            handle,
            reason,
            timestamp: Utc::now(),
        });
    }

    fn transition(&self, handle: ExchangeHandle, to: CompetitionState, reason: Option<&str>) {
        let mut runs = self.lock_runs();
        match runs.get_mut(&handle) {
            Some(run) => {
                if let Err(e) = run.advance(to, reason) {
                    warn!(%handle, error = %e, "Ignoring competition transition");
                }
            }
            None => debug!(%handle, "No run recorded for handle"),
        }
    }

    fn fail_run(&self, handle: ExchangeHandle, reason: &str) {
        if let Some(run) = self.lock_runs().get_mut(&handle) {
            if let Err(e) = run.fail(reason) {
                warn!(%handle, error = %e, "Ignoring competition failure transition");
            }
        }
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Copy of the running statistics
    pub fn statistics(&self) -> CompetitionStatistics {
        self.lock_stats().clone()
    }

    /// Read the statistics in place
    pub fn with_statistics<R>(&self, f: impl FnOnce(&CompetitionStatistics) -> R) -> R {
        f(&self.lock_stats())
    }

    /// Copy of the run tracking `handle`
    pub fn run(&self, handle: ExchangeHandle) -> Option<CompetitionRun> {
        self.lock_runs().get(&handle).cloned()
    }

    pub fn run_state(&self, handle: ExchangeHandle) -> Option<CompetitionState> {
        self.lock_runs().get(&handle).map(CompetitionRun::state)
    }
}
