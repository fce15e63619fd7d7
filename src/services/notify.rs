//! Notification Sinks
//!
//! `Notifier` implementations that need the application's runtime stack.
//! The trait itself and the dependency-free sinks live in `prospectiq-core`.

use prospectiq_core::{Notification, NotificationLevel, Notifier};
use tokio::sync::mpsc;

/// Writes every notification to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, n: Notification) {
        match n.level {
            NotificationLevel::Success => tracing::info!("[Notify] {}: {}", n.title, n.message),
            NotificationLevel::PartialSuccess => {
                tracing::warn!("[Notify] {} (partial): {}", n.title, n.message)
            }
            NotificationLevel::Invalid => {
                tracing::warn!("[Notify] {} (invalid): {}", n.title, n.message)
            }
            NotificationLevel::Error => tracing::error!("[Notify] {}: {}", n.title, n.message),
        }
    }
}

/// Forwards notifications into an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiving half the caller drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, n: Notification) {
        if self.tx.send(n).is_err() {
            tracing::debug!("[Notify] receiver dropped, notification discarded");
        }
    }
}
