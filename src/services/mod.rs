//! Services
//!
//! Business logic services for the application.
//! Services handle the core functionality and are called by commands.

pub mod assistant_sync;
pub mod icp;
pub mod notify;
pub mod prompt;
pub mod simulator;
pub mod task_store;
pub mod upload;

pub use assistant_sync::AssistantSynchronizer;
pub use icp::{IcpRow, IcpRowStore, IcpService, SqliteIcpStore, SupabaseIcpStore};
pub use notify::{ChannelNotifier, TracingNotifier};
pub use simulator::TaskSimulator;
pub use task_store::{MemoryTaskPersistence, SqliteTaskPersistence, TaskPersistence, TaskStore};
