//! Integration Tests Module
//!
//! End-to-end tests for the ProspectIQ backend. Tests cover ICP lifecycle with
//! assistant synchronization against a mock OpenAI server, the Supabase row
//! store, persisted task simulation, and the command layer.

// ICP service + OpenAI assistants (wiremock) + SQLite
mod icp_sync_test;

// ICP service over the Supabase REST API (wiremock)
mod supabase_store_test;

// Task store persistence and progress simulation
mod task_simulation_test;

// Command layer over a fully initialized AppState
mod commands_test;
