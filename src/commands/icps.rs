//! ICP Commands
//!
//! CRUD over Ideal Customer Profiles. Drafts and updates are validated here
//! so malformed input never reaches the store or the assistant API.

use crate::models::icp::{Icp, IcpDraft, IcpUpdate};
use crate::models::response::CommandResponse;
use crate::state::AppState;

/// List the current owner's ICPs, newest first
pub async fn list_icps(state: &AppState) -> CommandResponse<Vec<Icp>> {
    match state.icps().await {
        Ok(icps) => CommandResponse::ok(icps.list().await),
        Err(e) => CommandResponse::err(e.to_string()),
    }
}

/// Get a single ICP by id
pub async fn get_icp(state: &AppState, id: &str) -> CommandResponse<Icp> {
    let icps = match state.icps().await {
        Ok(icps) => icps,
        Err(e) => return CommandResponse::err(e.to_string()),
    };
    match icps.get_by_id(id).await {
        Some(icp) => CommandResponse::ok(icp),
        None => CommandResponse::err(format!("ICP with ID {} not found", id)),
    }
}

/// Create an ICP owned by the configured owner
pub async fn create_icp(state: &AppState, draft: IcpDraft) -> CommandResponse<Icp> {
    if let Err(e) = draft.validate() {
        return CommandResponse::err(e.to_string());
    }
    let icps = match state.icps().await {
        Ok(icps) => icps,
        Err(e) => return CommandResponse::err(e.to_string()),
    };

    let owner_id = icps.owner_id().to_string();
    match icps.create(draft, &owner_id).await {
        Some(icp) => CommandResponse::ok(icp),
        None => CommandResponse::err("Could not create ICP"),
    }
}

/// Apply a partial update to an ICP
pub async fn update_icp(state: &AppState, id: &str, update: IcpUpdate) -> CommandResponse<Icp> {
    if update.is_empty() {
        return CommandResponse::err("Nothing to update");
    }
    if let Err(e) = update.validate() {
        return CommandResponse::err(e.to_string());
    }
    let icps = match state.icps().await {
        Ok(icps) => icps,
        Err(e) => return CommandResponse::err(e.to_string()),
    };

    match icps.update(id, update).await {
        Some(icp) => CommandResponse::ok(icp),
        None => CommandResponse::err(format!("Could not update ICP {}", id)),
    }
}

/// Delete an ICP; `data` is whether a row was removed
pub async fn delete_icp(state: &AppState, id: &str) -> CommandResponse<bool> {
    match state.icps().await {
        Ok(icps) => CommandResponse::ok(icps.delete(id).await),
        Err(e) => CommandResponse::err(e.to_string()),
    }
}
