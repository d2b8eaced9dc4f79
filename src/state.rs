use std::sync::Arc;

use anyhow::Context;
use mamnon_config::{AssignmentPolicy, StorageBackend, StorageConfig};
use tracing::info;

use crate::modules::academic_years::service::AcademicYearService;
use crate::modules::classes::service::ClassService;
use crate::store::{MemoryStore, PgStore, PrefixedCodeGenerator, SchoolStore};

#[derive(Clone, Debug)]
pub struct AppState {
    pub classes: ClassService,
    pub academic_years: AcademicYearService,
}

impl AppState {
    pub fn new(store: Arc<dyn SchoolStore>, policy: AssignmentPolicy) -> Self {
        let codes = Arc::new(PrefixedCodeGenerator::new(policy.class_code_prefix.clone()));
        Self {
            classes: ClassService::new(store.clone(), codes, policy),
            academic_years: AcademicYearService::new(store),
        }
    }
}

/// Opens the configured store, applying migrations when asked to.
pub async fn init_store(config: &StorageConfig) -> anyhow::Result<Arc<dyn SchoolStore>> {
    match config.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;
            let pool = mamnon_db::init_db_pool(url, config.max_connections)
                .await
                .context("Failed to connect to database")?;
            if config.run_migrations {
                mamnon_db::run_migrations(&pool)
                    .await
                    .context("Failed to run migrations")?;
            }
            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}

pub async fn init_app_state(
    config: &StorageConfig,
    policy: AssignmentPolicy,
) -> anyhow::Result<AppState> {
    let store = init_store(config).await?;
    Ok(AppState::new(store, policy))
}
