use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{config::AppConfig, storage::SharedStorage};

/// Everything a handler needs, built once in `main` and passed down explicitly.
/// `DatabaseConnection` is not `Clone` under sea-orm's `mock` backend, so it is
/// shared through an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub orm: Arc<DatabaseConnection>,
    pub storage: SharedStorage,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(orm: DatabaseConnection, storage: SharedStorage, config: AppConfig) -> Self {
        Self {
            orm: Arc::new(orm),
            storage,
            config: Arc::new(config),
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.orm
    }
}
