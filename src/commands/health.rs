//! Health Check Commands
//!
//! Commands for checking the health status of backend services.

use crate::models::response::{CommandResponse, HealthResponse};
use crate::state::AppState;

/// Get the health status of all backend services
pub async fn get_health(state: &AppState) -> CommandResponse<HealthResponse> {
    let mut health = HealthResponse::default();

    health.database = state.is_database_healthy();
    health.config = state.is_config_healthy();

    if let Ok(icps) = state.icps().await {
        health.assistants = icps.assistants_enabled();
        health.icp_store = icps.backend().to_string();
    }
    if let Ok(simulator) = state.simulator().await {
        health.active_simulations = simulator.active_count();
    }

    // assistant sync is advisory and does not degrade the status
    health.status = if health.database && health.config {
        "healthy".to_string()
    } else {
        "degraded".to_string()
    };

    CommandResponse::ok(health)
}
