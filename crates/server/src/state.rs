use crate::config::Config;
use database::services::certificate::Issuer;
use mailer::Notifier;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use storage::BlobStore;

/// Shared handles injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub storage: Arc<dyn BlobStore>,
    pub notifier: Notifier,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn issuer(&self) -> Issuer<'_> {
        Issuer {
            storage: self.storage.as_ref(),
            notifier: &self.notifier,
            public_url: &self.config.public_url,
        }
    }
}
