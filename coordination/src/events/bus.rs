//! Event bus for panel state changes
//!
//! Pub/sub over a Tokio broadcast channel. Publishing never fails for lack
//! of subscribers: a client with no rendering attached is still a valid
//! client.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use super::types::PanelEvent;
use crate::agents::AgentId;

/// Channel capacity for broadcast
const CHANNEL_CAPACITY: usize = 256;

/// Shared reference to EventBus
pub type SharedEventBus = Arc<EventBus>;

/// Event bus with broadcast channels
pub struct EventBus {
    sender: broadcast::Sender<PanelEvent>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Create a shared reference to this event bus
    pub fn shared(self) -> SharedEventBus {
        Arc::new(self)
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: PanelEvent) {
        let event_type = event.event_type();
        match self.sender.send(event) {
            Ok(count) => debug!(event_type, receivers = count, "Event published"),
            Err(_) => debug!(event_type, "Event published (no receivers)"),
        }
    }

    /// Subscribe to receive events
    pub fn subscribe(&self) -> broadcast::Receiver<PanelEvent> {
        self.sender.subscribe()
    }

    /// Subscribe with a filter
    pub fn subscribe_filtered(&self, filter: EventFilter) -> FilteredReceiver {
        FilteredReceiver::new(self.subscribe(), filter)
    }

    /// Get the number of current subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Event filter for selective subscription
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Filter by agent
    pub agent: Option<AgentId>,
    /// Filter by event types
    pub event_types: Option<Vec<String>>,
}

impl EventFilter {
    /// Create a new empty filter (matches all events)
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by agent
    pub fn agent(mut self, agent: AgentId) -> Self {
        self.agent = Some(agent);
        self
    }

    /// Filter by event types
    pub fn types(mut self, event_types: Vec<&str>) -> Self {
        self.event_types = Some(event_types.into_iter().map(String::from).collect());
        self
    }

    /// Check if an event matches this filter
    pub fn matches(&self, event: &PanelEvent) -> bool {
        if let Some(agent) = self.agent {
            if event.agent() != Some(agent) {
                return false;
            }
        }

        if let Some(ref types) = self.event_types {
            if !types.iter().any(|t| t == event.event_type()) {
                return false;
            }
        }

        true
    }
}

/// Filtered event receiver that only yields matching events
pub struct FilteredReceiver {
    receiver: broadcast::Receiver<PanelEvent>,
    filter: EventFilter,
}

impl FilteredReceiver {
    /// Create a new filtered receiver
    pub fn new(receiver: broadcast::Receiver<PanelEvent>, filter: EventFilter) -> Self {
        Self { receiver, filter }
    }

    /// Receive the next matching event
    pub async fn recv(&mut self) -> Result<PanelEvent, broadcast::error::RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.filter.matches(&event) {
                return Ok(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_publish_subscribe() {
        let bus = EventBus::new();
        let mut receiver = bus.subscribe();

        bus.publish(PanelEvent::ModeChanged {
            competition: true,
            timestamp: Utc::now(),
        });

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.event_type(), "mode_changed");
    }

    #[test]
    fn test_publish_without_subscribers_is_ok() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);
        bus.publish(PanelEvent::StatisticsChanged {
            total_competitions: 1,
            timestamp: Utc::now(),
        });
    }

    #[test]
    fn test_event_filter() {
        let filter = EventFilter::new()
            .agent(AgentId::Compliance)
            .types(vec!["training_started", "training_failed"]);

        let matching = PanelEvent::TrainingStarted {
            agent: AgentId::Compliance,
            timestamp: Utc::now(),
        };
        let other_agent = PanelEvent::TrainingStarted {
            agent: AgentId::DataAnalytics,
            timestamp: Utc::now(),
        };
        let other_type = PanelEvent::TrainingCompleted {
            agent: AgentId::Compliance,
            score: 90.0,
            timestamp: Utc::now(),
        };

        assert!(filter.matches(&matching));
        assert!(!filter.matches(&other_agent));
        assert!(!filter.matches(&other_type));
    }

    #[tokio::test]
    async fn test_filtered_receiver() {
        let bus = EventBus::new().shared();
        let mut filtered =
            bus.subscribe_filtered(EventFilter::new().types(vec!["statistics_changed"]));

        let publisher = bus.clone();
        tokio::spawn(async move {
            publisher.publish(PanelEvent::ModeChanged {
                competition: true,
                timestamp: Utc::now(),
            });
            publisher.publish(PanelEvent::StatisticsChanged {
                total_competitions: 3,
                timestamp: Utc::now(),
            });
        });

        let event = filtered.recv().await.unwrap();
        assert!(matches!(
            event,
            PanelEvent::StatisticsChanged {
                total_competitions: 3,
                ..
            }
        ));
    }
}
