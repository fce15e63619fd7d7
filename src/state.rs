//! Application State
//!
//! Process-wide state shared by the command layer, containing all services.

use std::sync::Arc;
use tokio::sync::RwLock;

use prospectiq_core::Notifier;

use crate::models::settings::{AppConfig, SettingsUpdate, StoreBackend};
use crate::services::assistant_sync::AssistantSynchronizer;
use crate::services::icp::{IcpRowStore, IcpService, SqliteIcpStore, SupabaseIcpStore};
use crate::services::notify::TracingNotifier;
use crate::services::simulator::TaskSimulator;
use crate::services::task_store::{SqliteTaskPersistence, TaskStore};
use crate::storage::{ConfigService, Database, Secrets};
use crate::utils::error::{AppError, AppResult};

/// Application state handed to every command
pub struct AppState {
    /// SQLite database with connection pool
    database: Arc<RwLock<Option<Database>>>,
    /// Configuration service for app settings
    config: Arc<RwLock<Option<ConfigService>>>,
    /// Persisted analysis tasks
    tasks: Arc<RwLock<Option<Arc<TaskStore>>>>,
    /// Progress simulation for running tasks
    simulator: Arc<RwLock<Option<TaskSimulator>>>,
    /// ICP repository
    icps: Arc<RwLock<Option<Arc<IcpService>>>>,
    /// Sink for user-facing notifications
    notifier: Arc<dyn Notifier>,
    /// Whether the state has been initialized
    initialized: Arc<RwLock<bool>>,
}

impl AppState {
    /// Create a new uninitialized app state that logs notifications
    pub fn new() -> Self {
        Self::with_notifier(Arc::new(TracingNotifier))
    }

    /// Create a new uninitialized app state with a custom notification sink
    pub fn with_notifier(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            database: Arc::new(RwLock::new(None)),
            config: Arc::new(RwLock::new(None)),
            tasks: Arc::new(RwLock::new(None)),
            simulator: Arc::new(RwLock::new(None)),
            icps: Arc::new(RwLock::new(None)),
            notifier,
            initialized: Arc::new(RwLock::new(false)),
        }
    }

    /// Initialize all services from the config file, database file and environment
    pub async fn initialize(&self) -> AppResult<()> {
        if *self.initialized.read().await {
            return Ok(());
        }

        let config = ConfigService::new()?;
        let database = Database::new()?;
        let secrets = Secrets::from_env();
        let app_config = config.get_config_clone();

        let assistants =
            AssistantSynchronizer::from_config(secrets.openai_api_key.clone(), &app_config)?;
        let icp_store = build_icp_store(&app_config, &secrets, &database)?;

        self.initialize_with(config, database, icp_store, assistants)
            .await
    }

    /// Initialize from explicit parts.
    ///
    /// Loads the persisted tasks and resumes simulation of any task still
    /// marked running.
    pub async fn initialize_with(
        &self,
        config: ConfigService,
        database: Database,
        icp_store: Arc<dyn IcpRowStore>,
        assistants: AssistantSynchronizer,
    ) -> AppResult<()> {
        let mut initialized = self.initialized.write().await;
        if *initialized {
            return Ok(());
        }

        let app_config = config.get_config_clone();

        let task_store = Arc::new(TaskStore::load(Arc::new(SqliteTaskPersistence::new(
            database.clone(),
        ))));
        let simulator = TaskSimulator::new(task_store.clone(), app_config.simulation.clone());
        let icp_service = Arc::new(IcpService::new(
            icp_store,
            Arc::new(assistants),
            self.notifier.clone(),
            app_config.owner_id.clone(),
        ));

        tracing::info!(
            "[AppState] initialized with {} ICP store, assistant sync {}",
            icp_service.backend(),
            if icp_service.assistants_enabled() { "enabled" } else { "disabled" }
        );

        *self.database.write().await = Some(database);
        *self.config.write().await = Some(config);
        *self.tasks.write().await = Some(task_store);
        *self.icps.write().await = Some(icp_service);

        let resumed = simulator.resume_running();
        if resumed > 0 {
            tracing::info!("[AppState] resumed {} running task(s)", resumed);
        }
        *self.simulator.write().await = Some(simulator);

        *initialized = true;
        Ok(())
    }

    /// Stop all simulations
    pub async fn shutdown(&self) {
        if let Some(simulator) = &*self.simulator.read().await {
            simulator.shutdown();
        }
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        self.notifier.clone()
    }

    // ========================================================================
    // Health
    // ========================================================================

    /// Check if database is healthy
    pub fn is_database_healthy(&self) -> bool {
        // Use try_read to avoid blocking
        if let Ok(guard) = self.database.try_read() {
            if let Some(ref db) = *guard {
                return db.is_healthy();
            }
        }
        false
    }

    /// Check if config is healthy
    pub fn is_config_healthy(&self) -> bool {
        if let Ok(guard) = self.config.try_read() {
            if let Some(ref config) = *guard {
                return config.is_healthy();
            }
        }
        false
    }

    // ========================================================================
    // Service access
    // ========================================================================

    /// Get the current configuration
    pub async fn get_config(&self) -> AppResult<AppConfig> {
        let guard = self.config.read().await;
        match &*guard {
            Some(config) => Ok(config.get_config_clone()),
            None => Err(AppError::config("Config service not initialized")),
        }
    }

    /// Update the configuration.
    ///
    /// Services built from the configuration pick the change up on the next start.
    pub async fn update_config(&self, update: SettingsUpdate) -> AppResult<AppConfig> {
        let mut guard = self.config.write().await;
        match &mut *guard {
            Some(config) => config.update_config(update),
            None => Err(AppError::config("Config service not initialized")),
        }
    }

    pub async fn tasks(&self) -> AppResult<Arc<TaskStore>> {
        self.tasks
            .read()
            .await
            .clone()
            .ok_or_else(|| AppError::internal("Task store not initialized"))
    }

    pub async fn simulator(&self) -> AppResult<TaskSimulator> {
        self.simulator
            .read()
            .await
            .clone()
            .ok_or_else(|| AppError::internal("Task simulator not initialized"))
    }

    pub async fn icps(&self) -> AppResult<Arc<IcpService>> {
        self.icps
            .read()
            .await
            .clone()
            .ok_or_else(|| AppError::internal("ICP service not initialized"))
    }
}

/// Pick the ICP row store named by the configuration
fn build_icp_store(
    config: &AppConfig,
    secrets: &Secrets,
    database: &Database,
) -> AppResult<Arc<dyn IcpRowStore>> {
    match config.store_backend {
        StoreBackend::Sqlite => Ok(Arc::new(SqliteIcpStore::new(database.clone()))),
        StoreBackend::Supabase => {
            let url = config
                .supabase_url
                .as_deref()
                .ok_or_else(|| AppError::config("supabase_url is required for the supabase backend"))?;
            let anon_key = secrets.supabase_anon_key.clone().ok_or_else(|| {
                AppError::config("SUPABASE_ANON_KEY must be set for the supabase backend")
            })?;
            let proxy = config.proxy.clone().map(|p| p.with_env_password());
            Ok(Arc::new(SupabaseIcpStore::new(url, anon_key, proxy.as_ref())?))
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("initialized", &self.initialized)
            .finish()
    }
}
