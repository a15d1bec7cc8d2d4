//! Certification store
//!
//! Holds the last successfully fetched certification payload and the
//! client-side training display state. A refresh either replaces every
//! record at once or changes nothing.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::{debug, info, warn};

use super::types::{BadgeState, CertificationDetail, CertificationRecord, TrainingDisplay};
use crate::agents::AgentId;
use crate::backend::{SharedBackend, StatusPayload, TrainReply, TrainRequest};
use crate::error::{PanelError, PanelResult};
use crate::events::{PanelEvent, SharedEventBus};

/// Shared reference to CertificationStore
pub type SharedCertificationStore = Arc<CertificationStore>;

/// Records keyed by agent
pub type CertificationMap = HashMap<AgentId, CertificationRecord>;

#[derive(Debug, Default)]
struct StoreState {
    records: CertificationMap,
    displays: HashMap<AgentId, TrainingDisplay>,
}

/// Per-agent certification state synchronised from the backend
pub struct CertificationStore {
    backend: SharedBackend,
    bus: SharedEventBus,
    state: RwLock<StoreState>,
}

impl CertificationStore {
    /// Create an empty store
    pub fn new(backend: SharedBackend, bus: SharedEventBus) -> Self {
        Self {
            backend,
            bus,
            state: RwLock::new(StoreState::default()),
        }
    }

    /// Create a shared reference to this store
    pub fn shared(self) -> SharedCertificationStore {
        Arc::new(self)
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Refresh
    // =========================================================================

    /// Fetch status for every agent and replace the store contents.
    ///
    /// On failure the previous contents stay visible and the error is
    /// returned for the caller to log or drop.
    pub async fn refresh(&self) -> PanelResult<usize> {
        let fetched = self
            .backend
            .training_status()
            .await
            .map_err(PanelError::from)
            .and_then(|payload| parse_payload(&payload));

        match fetched {
            Ok(records) => {
                let count = records.len();
                self.replace(records);
                debug!(agents = count, "Certification records replaced");
                self.bus.publish(PanelEvent::CertificationsRefreshed {
                    agents: count,
                    timestamp: Utc::now(),
                });
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "Certification refresh failed, keeping previous state");
                self.bus.publish(PanelEvent::CertificationRefreshFailed {
                    reason: e.to_string(),
                    timestamp: Utc::now(),
                });
                Err(e)
            }
        }
    }

    /// Swap in a validated payload in one critical section.
    ///
    /// A failed-training display is cleared once backend truth shows the
    /// agent certified or training.
    fn replace(&self, records: CertificationMap) {
        let mut state = self.write();
        for (agent, record) in &records {
            let superseded = record.certified || record.training_in_progress;
            if superseded
                && matches!(state.displays.get(agent), Some(TrainingDisplay::Failed { .. }))
            {
                state.displays.remove(agent);
            }
        }
        state.records = records;
    }

    // =========================================================================
    // Training
    // =========================================================================

    /// Request (re)training of one agent and report the resulting score.
    ///
    /// The detail panel flips to `Initiating` immediately; records are only
    /// changed by the refresh that follows a successful answer. Concurrent
    /// calls for the same agent are independent and the last to finish
    /// decides the displayed state.
    pub async fn begin_training(&self, agent: AgentId, force_retrain: bool) -> PanelResult<f64> {
        if agent.is_panel() {
            return Err(PanelError::InvalidAgent(agent.to_string()));
        }

        self.set_display(agent, TrainingDisplay::Initiating);
        self.bus.publish(PanelEvent::TrainingStarted {
            agent,
            timestamp: Utc::now(),
        });
        info!(agent = %agent, force_retrain, "Training requested");

        let request = TrainRequest {
            agent_id: agent,
            force_retrain,
        };
        let outcome = match self.backend.train(&request).await {
            Ok(reply) => training_score(reply),
            Err(e) => Err(PanelError::TrainingFailure(e.to_string())),
        };

        match outcome {
            Ok(score) => {
                // A failed follow-up refresh is already logged; the score stands.
                let _ = self.refresh().await;
                self.set_display(agent, TrainingDisplay::Idle);
                info!(agent = %agent, score, "Training completed");
                self.bus.publish(PanelEvent::TrainingCompleted {
                    agent,
                    score,
                    timestamp: Utc::now(),
                });
                Ok(score)
            }
            Err(e) => {
                warn!(agent = %agent, error = %e, "Training failed");
                self.set_display(
                    agent,
                    TrainingDisplay::Failed {
                        reason: failure_reason(&e),
                    },
                );
                self.bus.publish(PanelEvent::TrainingFailed {
                    agent,
                    reason: e.to_string(),
                    timestamp: Utc::now(),
                });
                Err(e)
            }
        }
    }

    fn set_display(&self, agent: AgentId, display: TrainingDisplay) {
        let mut state = self.write();
        if display == TrainingDisplay::Idle {
            state.displays.remove(&agent);
        } else {
            state.displays.insert(agent, display);
        }
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Copy of one agent's record
    pub fn record(&self, agent: AgentId) -> Option<CertificationRecord> {
        self.read().records.get(&agent).cloned()
    }

    /// Copy of every record
    pub fn records(&self) -> CertificationMap {
        self.read().records.clone()
    }

    /// Badge for an agent; agents without a record are not certified.
    pub fn badge_state(&self, agent: AgentId) -> BadgeState {
        self.read()
            .records
            .get(&agent)
            .map(CertificationRecord::badge)
            .unwrap_or(BadgeState::NotCertified)
    }

    pub fn training_display(&self, agent: AgentId) -> TrainingDisplay {
        self.read()
            .displays
            .get(&agent)
            .cloned()
            .unwrap_or_default()
    }

    /// Detail panel contents; `None` for the panel pseudo-agent.
    pub fn certification_detail(&self, agent: AgentId) -> Option<CertificationDetail> {
        if agent.is_panel() {
            return None;
        }
        let state = self.read();
        let display = state.displays.get(&agent).cloned().unwrap_or_default();
        let badge = state
            .records
            .get(&agent)
            .map(CertificationRecord::badge)
            .unwrap_or(BadgeState::NotCertified);
        Some(CertificationDetail::derive(&display, badge))
    }
}

fn parse_payload(payload: &StatusPayload) -> PanelResult<CertificationMap> {
    let mut records = CertificationMap::new();
    for (key, entry) in payload {
        match AgentId::parse_competitor(key) {
            Ok(agent) => {
                records.insert(agent, CertificationRecord::from_entry(agent, entry)?);
            }
            Err(_) => debug!(key = %key, "Ignoring status for unknown agent"),
        }
    }
    Ok(records)
}

fn training_score(reply: TrainReply) -> PanelResult<f64> {
    if let Some(error) = reply.error {
        return Err(PanelError::TrainingFailure(error));
    }
    reply
        .details
        .and_then(|d| d.final_score)
        .filter(|s| s.is_finite())
        .ok_or_else(|| PanelError::TrainingFailure("response carried no final score".to_string()))
}

fn failure_reason(err: &PanelError) -> String {
    match err {
        PanelError::TrainingFailure(reason) => reason.clone(),
        other => other.to_string(),
    }
}
