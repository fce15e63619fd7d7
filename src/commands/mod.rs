//! Commands
//!
//! Entry points called by the CLI (or any other front end). Each takes the
//! shared `AppState` and returns a `CommandResponse`.

pub mod health;
pub mod icps;
pub mod init;
pub mod settings;
pub mod tasks;
pub mod upload;

pub use health::*;
pub use icps::*;
pub use init::*;
pub use settings::*;
pub use tasks::*;
pub use upload::*;
