//! Transient user-facing notices.
//!
//! The store reports fetch failures here; the HTTP layer adds success notices
//! for cart actions. Views drain the queue and render them as toasts.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Maximum queued notices; the oldest is dropped beyond this.
pub const MAX_PENDING_NOTICES: usize = 32;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A single notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notice {
    /// Success notice stamped now.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    /// Error notice stamped now.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}

/// Bounded FIFO of pending notices.
#[derive(Debug, Clone, Default)]
pub struct Notifications {
    pending: VecDeque<Notice>,
}

impl Notifications {
    /// Queue a notice, evicting the oldest if full.
    pub fn push(&mut self, notice: Notice) {
        if self.pending.len() >= MAX_PENDING_NOTICES {
            self.pending.pop_front();
        }
        self.pending.push_back(notice);
    }

    /// Take every pending notice, oldest first.
    pub fn drain(&mut self) -> Vec<Notice> {
        self.pending.drain(..).collect()
    }

    /// Pending notices without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.pending.iter()
    }

    /// Number of pending notices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_in_order() {
        let mut notices = Notifications::default();
        notices.push(Notice::success("Added to cart"));
        notices.push(Notice::error("Failed to load products"));

        let drained = notices.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained.first().map(|n| n.level), Some(NoticeLevel::Success));
        assert_eq!(drained.last().map(|n| n.message.as_str()), Some("Failed to load products"));
        assert!(notices.is_empty());
    }

    #[test]
    fn test_oldest_dropped_when_full() {
        let mut notices = Notifications::default();
        for i in 0..=MAX_PENDING_NOTICES {
            notices.push(Notice::success(format!("n{i}")));
        }
        assert_eq!(notices.len(), MAX_PENDING_NOTICES);
        assert_eq!(notices.iter().next().map(|n| n.message.as_str()), Some("n1"));
    }
}
