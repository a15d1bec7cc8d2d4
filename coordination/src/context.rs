//! Application context
//!
//! One explicitly constructed owner for every panel component. Hosts keep
//! an `Arc<AppContext>` and call into it from user actions and timers;
//! tests build a fresh one per case.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::agents::{AgentId, AgentRoster};
use crate::backend::SharedBackend;
use crate::certification::{CertificationStore, SharedCertificationStore};
use crate::competition::{CompetitionEngine, CompetitionStatistics, SharedCompetitionEngine};
use crate::conversation::{Conversation, ExchangeHandle, LogResult, SharedConversation};
use crate::dispatch::{QueryDispatcher, SharedDispatcher};
use crate::error::PanelResult;
use crate::events::{EventBus, PanelEvent, SharedEventBus};
use crate::leaderboard::{LeaderboardProjector, LeaderboardRow};
use crate::selection::{SelectionContext, SharedSelection};

/// Shared reference to AppContext
pub type SharedAppContext = Arc<AppContext>;

/// Every piece of client state, threaded through explicitly
pub struct AppContext {
    bus: SharedEventBus,
    backend: SharedBackend,
    store: SharedCertificationStore,
    selection: SharedSelection,
    conversation: SharedConversation,
    engine: SharedCompetitionEngine,
    dispatcher: SharedDispatcher,
    roster: RwLock<AgentRoster>,
    competition_mode: AtomicBool,
    force_retrain: bool,
    tracker: TaskTracker,
}

impl AppContext {
    /// Fresh client state over `backend`: panel selected, standard mode,
    /// empty log and zeroed statistics.
    pub fn new(backend: SharedBackend) -> Self {
        let bus = EventBus::new().shared();
        let tracker = TaskTracker::new();
        let conversation = Conversation::new(bus.clone()).shared();

        Self {
            store: CertificationStore::new(backend.clone(), bus.clone()).shared(),
            selection: SelectionContext::new(bus.clone()).shared(),
            engine: CompetitionEngine::new(
                backend.clone(),
                bus.clone(),
                conversation.clone(),
                tracker.clone(),
            )
            .shared(),
            dispatcher: QueryDispatcher::new(backend.clone(), conversation.clone(), tracker.clone())
                .shared(),
            conversation,
            roster: RwLock::new(AgentRoster::new()),
            competition_mode: AtomicBool::new(false),
            force_retrain: true,
            bus,
            backend,
            tracker,
        }
    }

    /// Whether training requests ask the backend to retrain certified agents
    pub fn with_force_retrain(mut self, force_retrain: bool) -> Self {
        self.force_retrain = force_retrain;
        self
    }

    pub fn shared(self) -> SharedAppContext {
        Arc::new(self)
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// Submit the text in the input box.
    ///
    /// Returns `None` for blank input. Otherwise the message and its
    /// typing indicator are in the log before this returns; the reply is
    /// folded in later.
    pub fn submit_message(&self, text: &str) -> Option<ExchangeHandle> {
        let query = text.trim();
        if query.is_empty() {
            return None;
        }

        let handle = if self.competition_mode() {
            let handle = self.conversation.open_exchange(query, AgentId::All);
            self.engine.dispatch(handle, query.to_string());
            handle
        } else {
            let agent = self.selection.active();
            let handle = self.conversation.open_exchange(query, agent);
            self.dispatcher.dispatch(handle, agent, query.to_string());
            handle
        };
        Some(handle)
    }

    /// Switch competition mode. Returns whether the mode changed.
    pub fn set_competition_mode(&self, enabled: bool) -> bool {
        if self.competition_mode.swap(enabled, Ordering::SeqCst) == enabled {
            return false;
        }

        info!(enabled, "Competition mode changed");
        if enabled {
            self.conversation.append_system(
                "Competition Mode",
                "AI agents will now compete to provide the fastest and most accurate responses.",
            );
        } else {
            self.conversation
                .append_system("Standard Mode", "Returning to standard query mode.");
        }
        self.bus.publish(PanelEvent::ModeChanged {
            competition: enabled,
            timestamp: Utc::now(),
        });
        true
    }

    pub fn competition_mode(&self) -> bool {
        self.competition_mode.load(Ordering::SeqCst)
    }

    /// Show or hide a competition result's analyses
    pub fn toggle_analyses(&self, handle: ExchangeHandle) -> LogResult<bool> {
        self.conversation.toggle_analyses(handle)
    }

    // =========================================================================
    // Agents
    // =========================================================================

    pub fn select(&self, agent: AgentId) -> bool {
        self.selection.select(agent)
    }

    pub fn active_agent(&self) -> AgentId {
        self.selection.active()
    }

    /// Refresh certification state; failures keep the previous state.
    pub async fn refresh_certifications(&self) {
        if let Err(e) = self.store.refresh().await {
            debug!(error = %e, "Certification refresh swallowed");
        }
    }

    /// Train an agent and announce the score in the transcript.
    ///
    /// Failure stays on the certification detail panel and is not logged
    /// as an exchange.
    pub async fn begin_training(&self, agent: AgentId) -> PanelResult<f64> {
        let score = self.store.begin_training(agent, self.force_retrain).await?;
        self.conversation.append_system(
            "Training Completed",
            format!(
                "{} has completed training with a score of {}%.",
                agent.display_name(),
                score
            ),
        );
        Ok(score)
    }

    /// Load provider details from `/api/agents`; failures keep the old roster.
    pub async fn load_roster(&self) -> usize {
        match self.backend.agents().await {
            Ok(reply) => {
                let mut roster = self.roster.write().unwrap_or_else(PoisonError::into_inner);
                roster.replace(reply.agents);
                debug!(agents = roster.len(), "Roster replaced");
                roster.len()
            }
            Err(e) => {
                warn!(error = %e, "Roster load failed, keeping previous roster");
                self.roster().len()
            }
        }
    }

    /// Copy of the roster
    pub fn roster(&self) -> AgentRoster {
        self.roster
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Provider serving `agent`, when the roster knows it
    pub fn provider(&self, agent: AgentId) -> Option<String> {
        self.roster
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .provider(agent)
            .map(String::from)
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn leaderboard(&self) -> Vec<LeaderboardRow> {
        self.engine.with_statistics(LeaderboardProjector::project)
    }

    pub fn statistics(&self) -> CompetitionStatistics {
        self.engine.statistics()
    }

    pub fn bus(&self) -> &SharedEventBus {
        &self.bus
    }

    pub fn store(&self) -> &SharedCertificationStore {
        &self.store
    }

    pub fn selection(&self) -> &SharedSelection {
        &self.selection
    }

    pub fn conversation(&self) -> &SharedConversation {
        &self.conversation
    }

    pub fn engine(&self) -> &SharedCompetitionEngine {
        &self.engine
    }

    pub fn dispatcher(&self) -> &SharedDispatcher {
        &self.dispatcher
    }

    /// Wait until every submitted query has been folded in.
    pub async fn wait_idle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{
        AgentsReply, BackendError, BackendResult, CompeteReply, CompeteRequest, PanelBackend,
        QueryReply, QueryRequest, StatusPayload, TrainReply, TrainRequest,
    };
    use crate::conversation::{Exchange, ExchangeKind};
    use async_trait::async_trait;

    struct Offline;

    #[async_trait]
    impl PanelBackend for Offline {
        async fn training_status(&self) -> BackendResult<StatusPayload> {
            Err(BackendError::Transport("offline".into()))
        }
        async fn train(&self, _request: &TrainRequest) -> BackendResult<TrainReply> {
            Err(BackendError::Transport("offline".into()))
        }
        async fn query(&self, _request: &QueryRequest) -> BackendResult<QueryReply> {
            Err(BackendError::Transport("offline".into()))
        }
        async fn compete(&self, _request: &CompeteRequest) -> BackendResult<CompeteReply> {
            Err(BackendError::Transport("offline".into()))
        }
        async fn agents(&self) -> BackendResult<AgentsReply> {
            Err(BackendError::Transport("offline".into()))
        }
    }

    fn context() -> AppContext {
        AppContext::new(Arc::new(Offline))
    }

    #[test]
    fn test_blank_message_is_ignored() {
        let ctx = context();
        assert_eq!(ctx.submit_message("   \n"), None);
        assert!(ctx.conversation().is_empty());
    }

    #[test]
    fn test_mode_toggle_appends_notice_once() {
        let ctx = context();
        assert!(!ctx.set_competition_mode(false));
        assert!(ctx.conversation().is_empty());

        assert!(ctx.set_competition_mode(true));
        assert!(!ctx.set_competition_mode(true));
        assert!(ctx.set_competition_mode(false));

        let titles: Vec<_> = ctx
            .conversation()
            .snapshot()
            .iter()
            .filter_map(|e| match e.exchange() {
                Some(Exchange::SystemNotice { title, .. }) => Some(title.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(titles, vec!["Competition Mode", "Standard Mode"]);
    }

    #[tokio::test]
    async fn test_offline_backend_stays_interactive() {
        let ctx = context();
        ctx.refresh_certifications().await;
        assert_eq!(ctx.load_roster().await, 0);

        let handle = ctx.submit_message("hello").unwrap();
        ctx.wait_idle().await;

        let entries = ctx.conversation().snapshot();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].handle, Some(handle));
        assert_eq!(entries[1].kind(), ExchangeKind::SystemNotice);

        // Tracker reopens, so later submissions still run
        ctx.submit_message("again").unwrap();
        ctx.wait_idle().await;
        assert_eq!(ctx.conversation().pending_count(), 0);
    }

    #[tokio::test]
    async fn test_training_failure_is_not_logged() {
        let ctx = context();
        assert!(ctx.begin_training(AgentId::Compliance).await.is_err());
        assert!(ctx.conversation().is_empty());
    }
}
