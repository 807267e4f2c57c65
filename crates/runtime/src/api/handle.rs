//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! every board gesture, plus topic subscriptions for rendering.
use std::collections::HashMap;

use board_core::{
    AttemptId, Availability, BoardSnapshot, BoardToken, InstanceId, ItemId, MergeSource, Position,
    Rejection,
};
use tokio::sync::{broadcast, mpsc, oneshot};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Result of a placement gesture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlaceOutcome {
    Placed(BoardToken),
    /// The drop had no effect; the token snaps back.
    Rejected(Rejection),
}

impl PlaceOutcome {
    pub fn token(&self) -> Option<&BoardToken> {
        match self {
            Self::Placed(token) => Some(token),
            Self::Rejected(_) => None,
        }
    }
}

/// Result of dropping something onto a token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Attempt accepted and the merge RPC is in flight. Its result arrives
    /// on [`Topic::Merge`].
    Pending(AttemptId),
    Rejected(Rejection),
}

impl MergeOutcome {
    pub fn attempt(&self) -> Option<AttemptId> {
        match self {
            Self::Pending(attempt) => Some(*attempt),
            Self::Rejected(_) => None,
        }
    }
}

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Places one unit of `item` on the board at `position` (clamped).
    pub async fn place(&self, item: impl Into<ItemId>, position: Position) -> Result<PlaceOutcome> {
        let item = item.into();
        self.request(|reply| Command::Place {
            item,
            position,
            reply,
        })
        .await
    }

    /// Repositions a token. Returns the clamped position, or `None` if the
    /// token is no longer on the board.
    pub async fn move_token(
        &self,
        instance: InstanceId,
        position: Position,
    ) -> Result<Option<Position>> {
        self.request(|reply| Command::Move {
            instance,
            position,
            reply,
        })
        .await
    }

    /// Removes a token; returns whether it existed.
    pub async fn remove(&self, instance: InstanceId) -> Result<bool> {
        self.request(|reply| Command::Remove { instance, reply })
            .await
    }

    /// Starts a merge of `dropped` onto `target`.
    pub async fn merge(&self, target: InstanceId, dropped: MergeSource) -> Result<MergeOutcome> {
        self.request(|reply| Command::BeginMerge {
            target,
            dropped,
            reply,
        })
        .await
    }

    /// Updates the inventory search text. The refetch runs once the text has
    /// been stable for the configured debounce.
    pub async fn search(&self, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        self.request(|reply| Command::Search { text, reply }).await
    }

    /// Refetches the inventory now and waits until the newest fetch has been
    /// applied. Returns the number of items in the snapshot.
    pub async fn refresh(&self) -> Result<usize> {
        self.request(|reply| Command::Refresh { reply }).await?
            .map_err(RuntimeError::Backend)
    }

    /// Clears the board and discards pending merges.
    pub async fn reset(&self) -> Result<Vec<AttemptId>> {
        self.request(|reply| Command::Reset { reply }).await
    }

    /// Query the current board (read-only snapshot)
    pub async fn board(&self) -> Result<BoardSnapshot> {
        self.request(|reply| Command::QueryBoard { reply }).await
    }

    pub async fn availability(&self, item: impl Into<ItemId>) -> Result<Availability> {
        let item = item.into();
        self.request(|reply| Command::QueryAvailability { item, reply })
            .await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Board` - Placement, movement, removal, settle and reset
    /// - `Topic::Merge` - Merge started, resolved and failed
    /// - `Topic::Inventory` - Refetch results
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
