//! ICP Service
//!
//! CRUD façade over an `IcpRowStore`, keeping each ICP's system prompt and
//! remote assistant in step with its definition.
//!
//! Operations fail soft: they return an empty list, `None` or `false` and
//! report the reason through the injected `Notifier`. Assistant sync is
//! advisory. A failed remote call never blocks the local write and is
//! reported as a partial success.

use std::sync::Arc;

use prospectiq_core::{Notification, Notifier};

use super::row::IcpRow;
use super::store::IcpRowStore;
use crate::models::icp::{AssistantLink, CustomParameter, Icp, IcpDraft, IcpUpdate};
use crate::services::assistant_sync::AssistantSynchronizer;

pub struct IcpService {
    store: Arc<dyn IcpRowStore>,
    assistants: Arc<AssistantSynchronizer>,
    notifier: Arc<dyn Notifier>,
    /// Rows listed by `list()` belong to this owner
    owner_id: String,
}

/// Result of reconciling the assistant during a write
struct SyncOutcome {
    link: AssistantLink,
    /// An assistant created by this write, to clean up if the row write fails
    created: Option<String>,
    failed: bool,
}

impl IcpService {
    pub fn new(
        store: Arc<dyn IcpRowStore>,
        assistants: Arc<AssistantSynchronizer>,
        notifier: Arc<dyn Notifier>,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            assistants,
            notifier,
            owner_id: owner_id.into(),
        }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn assistants_enabled(&self) -> bool {
        self.assistants.is_enabled()
    }

    fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// All ICPs of the current owner, newest first. Empty on failure.
    pub async fn list(&self) -> Vec<Icp> {
        let rows = match self.store.list(&self.owner_id).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!("[IcpService] failed to list ICPs: {}", e);
                self.notify(Notification::error("Error", "Could not fetch ICPs"));
                return Vec::new();
            }
        };

        rows.into_iter()
            .filter_map(|row| {
                let id = row.id.clone();
                match row.into_icp() {
                    Ok(icp) => Some(icp),
                    Err(e) => {
                        tracing::warn!("[IcpService] skipping unreadable ICP {}: {}", id, e);
                        None
                    }
                }
            })
            .collect()
    }

    /// Fetch one ICP. A missing row is `None` without an error notification.
    pub async fn get_by_id(&self, id: &str) -> Option<Icp> {
        match self.store.get(id).await.and_then(|row| row.map(IcpRow::into_icp).transpose()) {
            Ok(Some(icp)) => Some(icp),
            Ok(None) => {
                tracing::info!("[IcpService] ICP with id {} not found", id);
                None
            }
            Err(e) => {
                tracing::error!("[IcpService] failed to fetch ICP {}: {}", id, e);
                self.notify(Notification::error(
                    "Error",
                    format!("Could not fetch ICP (ID: {})", id),
                ));
                None
            }
        }
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Create an ICP, its system prompt and (best-effort) its assistant
    pub async fn create(&self, draft: IcpDraft, owner_id: &str) -> Option<Icp> {
        if let Err(e) = draft.validate() {
            self.notify(Notification::invalid("Invalid ICP", e.to_string()));
            return None;
        }

        let now = chrono::Utc::now().to_rfc3339();
        let mut icp = Icp {
            id: uuid::Uuid::new_v4().to_string(),
            name: draft.name,
            description: draft.description,
            custom_parameters: draft
                .custom_parameters
                .into_iter()
                .map(CustomParameter::normalized)
                .collect(),
            color: draft.color.unwrap_or_default(),
            assistant: AssistantLink::Unsynced,
            system_prompt: String::new(),
            owner_id: owner_id.to_string(),
            created_at: now.clone(),
            updated_at: now.clone(),
            date_modified: now,
        };
        icp.system_prompt = icp.render_system_prompt();

        let sync = self.reconcile_assistant(&icp, &AssistantLink::Unsynced).await;
        icp.assistant = sync.link.clone();

        let saved = match IcpRow::from_icp(&icp) {
            Ok(row) => self.store.insert(row).await.and_then(IcpRow::into_icp),
            Err(e) => Err(e),
        };

        match saved {
            Ok(saved) => {
                tracing::info!("[IcpService] created ICP {} ({})", saved.id, saved.name);
                if sync.failed {
                    self.notify(Notification::partial(
                        "Partial Success",
                        "ICP saved, but its AI assistant could not be created. It will be retried on the next edit.",
                    ));
                } else {
                    self.notify(Notification::success("Success", "ICP created successfully!"));
                }
                Some(saved)
            }
            Err(e) => {
                tracing::error!("[IcpService] failed to add ICP: {}", e);
                self.discard_orphan(sync.created.as_deref()).await;
                self.notify(Notification::error("Error", "Could not add ICP"));
                None
            }
        }
    }

    /// Apply a partial update.
    ///
    /// When the update touches name, description or parameters the prompt is
    /// regenerated, and the assistant is updated (or created, if the ICP has
    /// none) whenever the prompt changed or the ICP is still unsynced.
    pub async fn update(&self, id: &str, update: IcpUpdate) -> Option<Icp> {
        if let Err(e) = update.validate() {
            self.notify(Notification::invalid("Invalid ICP", e.to_string()));
            return None;
        }

        let current = match self.store.get(id).await.and_then(|row| row.map(IcpRow::into_icp).transpose()) {
            Ok(Some(icp)) => icp,
            Ok(None) => {
                self.notify_update_not_found(id);
                return None;
            }
            Err(e) => {
                tracing::error!("[IcpService] failed to load ICP {} for update: {}", id, e);
                self.notify(Notification::error("Error", "Could not update ICP"));
                return None;
            }
        };

        let affects_prompt = update.affects_prompt();
        let mut icp = current.clone();
        update.apply_to(&mut icp);

        let now = chrono::Utc::now().to_rfc3339();
        icp.updated_at = now.clone();
        icp.date_modified = now;

        let mut sync = SyncOutcome {
            link: current.assistant.clone(),
            created: None,
            failed: false,
        };
        if affects_prompt {
            icp.system_prompt = icp.render_system_prompt();
            let prompt_changed = icp.system_prompt != current.system_prompt;
            if prompt_changed || !current.assistant.is_synced() {
                sync = self.reconcile_assistant(&icp, &current.assistant).await;
            }
        }
        icp.assistant = sync.link.clone();

        let saved = match IcpRow::from_icp(&icp) {
            Ok(row) => self
                .store
                .update(row)
                .await
                .and_then(|row| row.map(IcpRow::into_icp).transpose()),
            Err(e) => Err(e),
        };

        match saved {
            Ok(Some(saved)) => {
                tracing::info!("[IcpService] updated ICP {}", saved.id);
                if sync.failed {
                    self.notify(Notification::partial(
                        "Partial Success",
                        "ICP updated, but its AI assistant could not be synchronized.",
                    ));
                } else {
                    self.notify(Notification::success("Success", "ICP updated successfully!"));
                }
                Some(saved)
            }
            Ok(None) => {
                self.discard_orphan(sync.created.as_deref()).await;
                self.notify_update_not_found(id);
                None
            }
            Err(e) => {
                tracing::error!("[IcpService] failed to update ICP {}: {}", id, e);
                self.discard_orphan(sync.created.as_deref()).await;
                self.notify(Notification::error("Error", "Could not update ICP"));
                None
            }
        }
    }

    /// Delete an ICP and (best-effort, first) its assistant.
    ///
    /// Returns whether a row existed and was removed.
    pub async fn delete(&self, id: &str) -> bool {
        let current = match self.store.get(id).await {
            Ok(Some(row)) => AssistantLink::from(row.assistant_id),
            Ok(None) => {
                tracing::info!("[IcpService] ICP {} not found, nothing to delete", id);
                return false;
            }
            Err(e) => {
                tracing::error!("[IcpService] failed to load ICP {} for delete: {}", id, e);
                self.notify(Notification::error("Error", "Could not delete ICP"));
                return false;
            }
        };

        let assistant_failed = match &current {
            AssistantLink::Synced(assistant_id) => !self.assistants.delete(assistant_id).await,
            AssistantLink::Unsynced => false,
        };

        match self.store.delete(id).await {
            Ok(true) => {
                tracing::info!("[IcpService] deleted ICP {}", id);
                if assistant_failed {
                    self.notify(Notification::partial(
                        "Partial Success",
                        "ICP deleted, but its AI assistant could not be removed.",
                    ));
                } else {
                    self.notify(Notification::success("Success", "ICP deleted successfully."));
                }
                true
            }
            Ok(false) => {
                tracing::info!("[IcpService] ICP {} already removed", id);
                false
            }
            Err(e) => {
                tracing::error!("[IcpService] failed to delete ICP {}: {}", id, e);
                self.notify(Notification::error("Error", "Could not delete ICP"));
                false
            }
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Bring the assistant in line with `icp`: update when linked, create otherwise
    async fn reconcile_assistant(&self, icp: &Icp, link: &AssistantLink) -> SyncOutcome {
        match link {
            AssistantLink::Synced(assistant_id) => {
                match self
                    .assistants
                    .update(assistant_id, &icp.name, &icp.system_prompt)
                    .await
                {
                    Some(new_id) => SyncOutcome {
                        link: AssistantLink::Synced(new_id),
                        created: None,
                        failed: false,
                    },
                    // keep the link so the next edit retries the update
                    None => SyncOutcome {
                        link: link.clone(),
                        created: None,
                        failed: true,
                    },
                }
            }
            AssistantLink::Unsynced => {
                match self.assistants.create(&icp.name, &icp.system_prompt).await {
                    Some(new_id) => SyncOutcome {
                        link: AssistantLink::Synced(new_id.clone()),
                        created: Some(new_id),
                        failed: false,
                    },
                    None => SyncOutcome {
                        link: AssistantLink::Unsynced,
                        created: None,
                        failed: true,
                    },
                }
            }
        }
    }

    /// Best-effort removal of an assistant whose row was never written
    async fn discard_orphan(&self, assistant_id: Option<&str>) {
        if let Some(assistant_id) = assistant_id {
            if !self.assistants.delete(assistant_id).await {
                tracing::warn!(
                    "[IcpService] orphaned assistant {} could not be removed",
                    assistant_id
                );
            }
        }
    }

    fn notify_update_not_found(&self, id: &str) {
        self.notify(Notification::error(
            "Update Failed",
            format!("ICP with ID {} not found. Cannot update.", id),
        ));
    }
}
