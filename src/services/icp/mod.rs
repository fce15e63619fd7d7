//! ICP Repository
//!
//! - `row` - wire row shape and mapping to `Icp`
//! - `store` - `IcpRowStore` trait and the SQLite backend
//! - `supabase` - Supabase (PostgREST) backend
//! - `service` - `IcpService`, CRUD with prompt and assistant reconciliation

pub mod row;
pub mod service;
pub mod store;
pub mod supabase;

pub use row::IcpRow;
pub use service::IcpService;
pub use store::{IcpRowStore, SqliteIcpStore};
pub use supabase::SupabaseIcpStore;
