//! Notifications
//!
//! The channel through which repository and synchronizer outcomes reach the
//! caller. Operations that fail soft (returning an empty list, `None` or
//! `false`) report *why* here instead of through their return value.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Severity of a notification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    /// The operation completed as requested
    Success,
    /// The local write succeeded but a best-effort remote step did not
    PartialSuccess,
    /// The operation failed and returned its sentinel value
    Error,
    /// Input was rejected before any remote call was attempted
    Invalid,
}

/// A single user-facing notification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, title, message)
    }

    pub fn partial(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::PartialSuccess, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, title, message)
    }

    pub fn invalid(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Invalid, title, message)
    }

    fn new(level: NotificationLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Sink for notifications.
///
/// Implementations must not block: `notify` is called from inside async
/// service methods.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Keeps every notification in memory, in arrival order
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    received: Mutex<Vec<Notification>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything received so far
    pub fn received(&self) -> Vec<Notification> {
        match self.received.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Levels of everything received so far
    pub fn levels(&self) -> Vec<NotificationLevel> {
        self.received().into_iter().map(|n| n.level).collect()
    }

    /// Drain all received notifications
    pub fn take(&self) -> Vec<Notification> {
        match self.received.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notification: Notification) {
        match self.received.lock() {
            Ok(mut guard) => guard.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}
