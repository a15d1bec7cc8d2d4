//! Active agent selection
//!
//! Backed by a `watch` channel: dependents holding a receiver see the new
//! value as soon as `select` returns, and re-selecting the current agent
//! does not wake them.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::debug;

use crate::agents::AgentId;
use crate::events::{PanelEvent, SharedEventBus};

/// Shared reference to SelectionContext
pub type SharedSelection = Arc<SelectionContext>;

/// Tracks which agent (or the whole panel) the user is talking to
pub struct SelectionContext {
    sender: watch::Sender<AgentId>,
    bus: SharedEventBus,
}

impl SelectionContext {
    /// Start with the full panel selected
    pub fn new(bus: SharedEventBus) -> Self {
        let (sender, _) = watch::channel(AgentId::All);
        Self { sender, bus }
    }

    pub fn shared(self) -> SharedSelection {
        Arc::new(self)
    }

    /// Select an agent. Returns whether the selection changed.
    pub fn select(&self, agent: AgentId) -> bool {
        let changed = self.sender.send_if_modified(|current| {
            if *current == agent {
                false
            } else {
                *current = agent;
                true
            }
        });

        if changed {
            debug!(agent = %agent, "Selection changed");
            self.bus.publish(PanelEvent::SelectionChanged {
                agent,
                timestamp: Utc::now(),
            });
        }
        changed
    }

    /// Currently active agent
    pub fn active(&self) -> AgentId {
        *self.sender.borrow()
    }

    /// Receiver notified on every change
    pub fn subscribe(&self) -> watch::Receiver<AgentId> {
        self.sender.subscribe()
    }
}
