//! ProspectIQ - Rust Backend Library
//!
//! Backend for matching company lists against Ideal Customer Profiles.
//! It includes:
//! - Command handlers used by the CLI
//! - Business logic services (task store, progress simulator, ICP repository,
//!   assistant synchronization, prompt generation)
//! - Storage layer (SQLite, JSON config)
//! - Data models and utilities

pub mod commands;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

// Re-export commonly used items from commands
pub use commands::{
    // Init commands
    init_app, get_version,
    // Health commands
    get_health,
    // Settings commands
    get_settings, update_settings,
    // ICP commands
    list_icps, get_icp, create_icp, update_icp, delete_icp,
    // Task commands
    start_analysis, list_running_tasks, list_completed_tasks, get_task, delete_task,
    StartAnalysisRequest,
    // Upload commands
    get_csv_template, validate_upload_file, validate_upload_at,
};
// Re-export models (avoiding settings module conflict)
pub use models::response::*;
pub use models::settings::{AppConfig, SettingsUpdate};
pub use state::AppState;
pub use utils::error::{AppError, AppResult};
