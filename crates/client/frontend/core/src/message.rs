//! Toast log shared by every frontend.
use std::collections::VecDeque;

/// Severity level for toasts produced from runtime events.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

/// Snapshot of a single toast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageEntry {
    pub text: String,
    pub level: MessageLevel,
}

impl MessageEntry {
    pub fn new(text: impl Into<String>, level: MessageLevel) -> Self {
        Self {
            text: text.into(),
            level,
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(text, MessageLevel::Info)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(text, MessageLevel::Warning)
    }
}

/// Bounded queue of toasts; the oldest entry is dropped when full.
#[derive(Clone, Debug)]
pub struct MessageLog {
    entries: VecDeque<MessageEntry>,
    capacity: usize,
}

impl MessageLog {
    pub fn new(capacity: usize) -> Self {
        let bounded_capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(bounded_capacity),
            capacity: bounded_capacity,
        }
    }

    pub fn push(&mut self, entry: MessageEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn push_text(&mut self, message: impl Into<String>) {
        self.push(MessageEntry::info(message));
    }

    /// Newest first.
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &MessageEntry> {
        self.entries.iter().rev().take(limit)
    }

    pub fn latest(&self) -> Option<&MessageEntry> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MessageEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_toast_is_evicted_at_capacity() {
        let mut log = MessageLog::new(2);
        log.push_text("one");
        log.push(MessageEntry::warning("two"));
        log.push_text("three");

        let texts: Vec<_> = log.iter().map(|entry| entry.text.as_str()).collect();
        assert_eq!(texts, ["two", "three"]);
        assert_eq!(log.recent(1).next().map(|e| e.text.as_str()), Some("three"));
        assert_eq!(log.iter().next().map(|e| e.level), Some(MessageLevel::Warning));
    }

    #[test]
    fn zero_capacity_still_keeps_one_entry() {
        let mut log = MessageLog::new(0);
        log.push_text("kept");
        assert_eq!(log.len(), 1);
    }
}
