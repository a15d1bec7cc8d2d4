//! Ordered conversation log
//!
//! Replies are placed by handle, not by arrival: a query reserves its slot
//! (user message + typing indicator) when it is submitted, and the reply
//! later replaces the indicator in place. The transcript therefore always
//! reads in submission order however the backend reorders responses.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};

use super::exchange::{Exchange, ExchangeHandle, ExchangeKind, LogEntry, Slot};
use crate::agents::AgentId;
use crate::events::{PanelEvent, SharedEventBus};

/// Error type for log operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogError {
    #[error("Handle {0} already resolved or never issued")]
    DuplicateResolution(ExchangeHandle),

    #[error("Handle {0} was never issued")]
    UnknownHandle(ExchangeHandle),

    #[error("Handle {0} already has a pending reply")]
    PendingExists(ExchangeHandle),

    #[error("Entry {0} is not a competition result")]
    NotCompetition(ExchangeHandle),

    #[error("A {0:?} cannot resolve a pending reply")]
    NotAReply(ExchangeKind),
}

/// Result type for log operations
pub type LogResult<T> = Result<T, LogError>;

/// Append-only, position-stable transcript
#[derive(Debug, Default)]
pub struct ConversationLog {
    entries: Vec<LogEntry>,
    next_handle: u64,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user message and issue the handle its reply will carry.
    pub fn append_user(&mut self, text: impl Into<String>) -> ExchangeHandle {
        let handle = ExchangeHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push(LogEntry {
            handle: Some(handle),
            slot: Slot::Resolved {
                exchange: Exchange::UserQuery { text: text.into() },
            },
            analyses_visible: false,
        });
        handle
    }

    /// Reserve the reply slot for `handle` with a typing indicator.
    pub fn append_pending(&mut self, agent: AgentId, handle: ExchangeHandle) -> LogResult<()> {
        if handle.0 >= self.next_handle {
            return Err(LogError::UnknownHandle(handle));
        }
        if self.pending_position(handle).is_some() {
            return Err(LogError::PendingExists(handle));
        }
        self.entries.push(LogEntry {
            handle: Some(handle),
            slot: Slot::Pending { agent },
            analyses_visible: false,
        });
        Ok(())
    }

    /// Replace the pending slot of `handle` with its final exchange,
    /// keeping the slot's position. Returns that position.
    ///
    /// An unknown or already-resolved handle leaves the log untouched.
    pub fn resolve(&mut self, handle: ExchangeHandle, exchange: Exchange) -> LogResult<usize> {
        if !exchange.is_reply() {
            return Err(LogError::NotAReply(exchange.kind()));
        }
        let Some(position) = self.pending_position(handle) else {
            warn!(%handle, "Ignoring duplicate resolution");
            return Err(LogError::DuplicateResolution(handle));
        };
        debug!(%handle, position, kind = ?exchange.kind(), "Resolved pending reply");
        self.entries[position].slot = Slot::Resolved { exchange };
        Ok(position)
    }

    /// Append a system notice at the tail.
    pub fn append_system(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.entries.push(LogEntry {
            handle: None,
            slot: Slot::Resolved {
                exchange: Exchange::notice(title, message),
            },
            analyses_visible: false,
        });
    }

    /// Flip the show/hide state of a competition result's analyses.
    /// Returns the new visibility.
    pub fn toggle_analyses(&mut self, handle: ExchangeHandle) -> LogResult<bool> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| {
                e.handle == Some(handle) && e.kind() == ExchangeKind::CompetitionResult
            })
            .ok_or(LogError::NotCompetition(handle))?;
        entry.analyses_visible = !entry.analyses_visible;
        Ok(entry.analyses_visible)
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of replies still outstanding
    pub fn pending_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_pending()).count()
    }

    /// Resolved exchanges, in log order
    pub fn exchanges(&self) -> impl Iterator<Item = &Exchange> {
        self.entries.iter().filter_map(LogEntry::exchange)
    }

    fn pending_position(&self, handle: ExchangeHandle) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.handle == Some(handle) && e.is_pending())
    }
}

// =========================================================================
// Shared log
// =========================================================================

/// Shared reference to Conversation
pub type SharedConversation = Arc<Conversation>;

/// The conversation log as shared between components.
///
/// Each operation is a single critical section followed by an event.
pub struct Conversation {
    log: Mutex<ConversationLog>,
    bus: SharedEventBus,
}

impl Conversation {
    pub fn new(bus: SharedEventBus) -> Self {
        Self {
            log: Mutex::new(ConversationLog::new()),
            bus,
        }
    }

    pub fn shared(self) -> SharedConversation {
        Arc::new(self)
    }

    fn lock(&self) -> MutexGuard<'_, ConversationLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append the user's message and its typing indicator in one step.
    pub fn open_exchange(&self, text: impl Into<String>, agent: AgentId) -> ExchangeHandle {
        let handle = {
            let mut log = self.lock();
            let handle = log.append_user(text);
            // A freshly issued handle has no pending slot yet.
            let _ = log.append_pending(agent, handle);
            handle
        };
        self.bus.publish(PanelEvent::ExchangeAppended {
            handle: Some(handle),
            kind: ExchangeKind::UserQuery,
            timestamp: Utc::now(),
        });
        handle
    }

    pub fn append_user(&self, text: impl Into<String>) -> ExchangeHandle {
        let handle = self.lock().append_user(text);
        self.bus.publish(PanelEvent::ExchangeAppended {
            handle: Some(handle),
            kind: ExchangeKind::UserQuery,
            timestamp: Utc::now(),
        });
        handle
    }

    pub fn append_pending(&self, agent: AgentId, handle: ExchangeHandle) -> LogResult<()> {
        self.lock().append_pending(agent, handle)?;
        self.bus.publish(PanelEvent::ExchangeAppended {
            handle: Some(handle),
            kind: ExchangeKind::Pending,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    pub fn resolve(&self, handle: ExchangeHandle, exchange: Exchange) -> LogResult<usize> {
        let kind = exchange.kind();
        let position = self.lock().resolve(handle, exchange)?;
        self.bus.publish(PanelEvent::ExchangeResolved {
            handle,
            kind,
            timestamp: Utc::now(),
        });
        Ok(position)
    }

    pub fn append_system(&self, title: impl Into<String>, message: impl Into<String>) {
        self.lock().append_system(title, message);
        self.bus.publish(PanelEvent::ExchangeAppended {
            handle: None,
            kind: ExchangeKind::SystemNotice,
            timestamp: Utc::now(),
        });
    }

    pub fn toggle_analyses(&self, handle: ExchangeHandle) -> LogResult<bool> {
        self.lock().toggle_analyses(handle)
    }

    /// Copy of the current entries
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.lock().entries().to_vec()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.lock().pending_count()
    }

    /// Run `f` against the log under the lock
    pub fn with_log<R>(&self, f: impl FnOnce(&ConversationLog) -> R) -> R {
        f(&self.lock())
    }
}
