//! Data Models
//!
//! Contains all data structures used throughout the application.

pub mod icp;
pub mod response;
pub mod settings;
pub mod task;

pub use icp::*;
pub use response::*;
pub use settings::*;
pub use task::*;
