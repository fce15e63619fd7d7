//! ProspectIQ Core
//!
//! Shared types for the ProspectIQ workspace that carry no application-level
//! dependencies (no database, no HTTP, no async runtime).
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `notify` - Caller-facing notification channel (`Notification`, `Notifier`)
//! - `proxy` - Proxy configuration shared by every HTTP client in the workspace

pub mod error;
pub mod notify;
pub mod proxy;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Notifications ──────────────────────────────────────────────────────
pub use notify::{CollectingNotifier, Notification, NotificationLevel, Notifier};

// ── Proxy Types ────────────────────────────────────────────────────────
pub use proxy::{ProxyConfig, ProxyProtocol};
