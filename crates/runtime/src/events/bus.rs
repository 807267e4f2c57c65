//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{BoardEvent, InventoryEvent, MergeEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Token placement, movement, removal and reset
    Board,
    /// Merge attempt lifecycle
    Merge,
    /// Inventory refetch results
    Inventory,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Board, Topic::Merge, Topic::Inventory];
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Board(BoardEvent),
    Merge(MergeEvent),
    Inventory(InventoryEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Board(_) => Topic::Board,
            Event::Merge(_) => Topic::Merge,
            Event::Inventory(_) => Topic::Inventory,
        }
    }
}

impl From<BoardEvent> for Event {
    fn from(event: BoardEvent) -> Self {
        Event::Board(event)
    }
}

impl From<MergeEvent> for Event {
    fn from(event: MergeEvent) -> Self {
        Event::Merge(event)
    }
}

impl From<InventoryEvent> for Event {
    fn from(event: InventoryEvent) -> Self {
        Event::Inventory(event)
    }
}

struct Channels {
    board: broadcast::Sender<Event>,
    merge: broadcast::Sender<Event>,
    inventory: broadcast::Sender<Event>,
}

impl Channels {
    fn get(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Board => &self.board,
            Topic::Merge => &self.merge,
            Topic::Inventory => &self.inventory,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Publishing is best-effort: events sent while a
/// topic has no subscribers are dropped.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<Channels>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: Arc::new(Channels {
                board: broadcast::channel(capacity).0,
                merge: broadcast::channel(capacity).0,
                inventory: broadcast::channel(capacity).0,
            }),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();
        if self.channels.get(topic).send(event).is_err() {
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channels.get(topic).subscribe()
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use board_core::InstanceId;

    use super::*;

    #[tokio::test]
    async fn events_reach_only_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut board_rx = bus.subscribe(Topic::Board);
        let mut merge_rx = bus.subscribe(Topic::Merge);

        bus.publish(BoardEvent::TokenRemoved {
            instance: InstanceId::from("wood-1-1"),
        });

        let event = board_rx.recv().await.unwrap();
        assert_eq!(event.topic(), Topic::Board);
        assert!(merge_rx.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let bus = EventBus::default();
        bus.publish(InventoryEvent::InventoryRefreshFailed {
            generation: 1,
            error: "offline".into(),
        });
        assert_eq!(bus.subscribe_multiple(&Topic::ALL).len(), 3);
    }
}
