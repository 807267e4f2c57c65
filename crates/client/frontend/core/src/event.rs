//! Utilities for reacting to runtime events inside UI layers.
use board_runtime::{BoardEvent, Event, InventoryEvent, MergeEvent};

use crate::config::MessageConfig;
use crate::message::{MessageEntry, MessageLog};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventImpact {
    pub requires_redraw: bool,
}

impl EventImpact {
    pub const fn none() -> Self {
        Self {
            requires_redraw: false,
        }
    }

    pub const fn redraw() -> Self {
        Self {
            requires_redraw: true,
        }
    }

    pub fn combine(self, other: Self) -> Self {
        Self {
            requires_redraw: self.requires_redraw || other.requires_redraw,
        }
    }
}

pub trait EventConsumer {
    fn on_event(&mut self, event: &Event) -> EventImpact;
    fn message_log(&self) -> &MessageLog;
    fn message_log_mut(&mut self) -> &mut MessageLog;
    fn take_message_log(self) -> MessageLog
    where
        Self: Sized;
}

/// Turns runtime events into user-facing toasts.
///
/// Failed merges and failed refetches always produce a warning; the user is
/// never left guessing why a token jumped back.
#[derive(Clone, Debug)]
pub struct ToastConsumer {
    config: MessageConfig,
    log: MessageLog,
}

impl ToastConsumer {
    pub fn new(config: MessageConfig) -> Self {
        let log = MessageLog::new(config.capacity);
        Self { config, log }
    }
}

impl Default for ToastConsumer {
    fn default() -> Self {
        Self::new(MessageConfig::default())
    }
}

impl EventConsumer for ToastConsumer {
    fn on_event(&mut self, event: &Event) -> EventImpact {
        match event {
            Event::Board(BoardEvent::BoardReset { discarded }) => {
                if !discarded.is_empty() {
                    self.log.push_text(format!(
                        "Board cleared, {} pending merge(s) discarded",
                        discarded.len()
                    ));
                }
                EventImpact::redraw()
            }
            Event::Board(_) => EventImpact::redraw(),

            Event::Merge(MergeEvent::MergeStarted { .. }) => EventImpact::redraw(),
            Event::Merge(MergeEvent::MergeResolved { token, .. }) => {
                if self.config.show_merges {
                    self.log
                        .push_text(format!("Crafted {} {}", token.emoji, token.title));
                }
                EventImpact::redraw()
            }
            Event::Merge(MergeEvent::MergeFailed { error, returned, .. }) => {
                let text = match returned {
                    Some(_) => format!("Merge failed: {error}. The item went back to the tray"),
                    None => format!("Merge failed: {error}"),
                };
                self.log.push(MessageEntry::warning(text));
                EventImpact::redraw()
            }

            Event::Inventory(InventoryEvent::InventoryRefreshed { items, search, .. }) => {
                if self.config.show_refreshes {
                    let text = if search.is_empty() {
                        format!("Inventory updated ({items} items)")
                    } else {
                        format!("{items} items match \"{search}\"")
                    };
                    self.log.push_text(text);
                }
                EventImpact::redraw()
            }
            Event::Inventory(InventoryEvent::InventoryRefreshFailed { error, .. }) => {
                self.log
                    .push(MessageEntry::warning(format!("Could not load inventory: {error}")));
                EventImpact::none()
            }
        }
    }

    fn message_log(&self) -> &MessageLog {
        &self.log
    }

    fn message_log_mut(&mut self) -> &mut MessageLog {
        &mut self.log
    }

    fn take_message_log(self) -> MessageLog {
        self.log
    }
}

#[cfg(test)]
mod tests {
    use board_core::{AttemptId, BoardToken, InstanceId, InventoryItem, Position};

    use super::*;
    use crate::message::MessageLevel;

    #[test]
    fn failures_surface_as_warnings() {
        let mut consumer = ToastConsumer::default();

        let impact = consumer.on_event(&Event::Merge(MergeEvent::MergeFailed {
            attempt: AttemptId(1),
            restored: vec![InstanceId::from("wood-1-1")],
            returned: None,
            error: "network error: timed out".into(),
        }));
        assert!(impact.requires_redraw);

        consumer.on_event(&Event::Inventory(InventoryEvent::InventoryRefreshFailed {
            generation: 3,
            error: "backend rejected the request (500)".into(),
        }));

        let levels: Vec<_> = consumer.message_log().iter().map(|e| e.level).collect();
        assert_eq!(levels, [MessageLevel::Warning, MessageLevel::Warning]);
        assert!(
            consumer
                .message_log()
                .latest()
                .is_some_and(|entry| entry.text.contains("(500)"))
        );
    }

    #[test]
    fn resolved_merges_are_announced_and_refreshes_are_quiet() {
        let mut consumer = ToastConsumer::default();
        let item = InventoryItem::new("golem", "Golem", "🗿");
        let token = BoardToken::from_item(InstanceId::from("golem-1-9"), &item, Position::ORIGIN);

        consumer.on_event(&Event::Merge(MergeEvent::MergeResolved {
            attempt: AttemptId(2),
            target: InstanceId::from("mud-1-1"),
            dropped: Some(InstanceId::from("stone-1-2")),
            token,
        }));
        consumer.on_event(&Event::Inventory(InventoryEvent::InventoryRefreshed {
            generation: 4,
            search: String::new(),
            items: 7,
        }));

        let log = consumer.take_message_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log.latest().map(|e| e.text.as_str()), Some("Crafted 🗿 Golem"));
    }
}
