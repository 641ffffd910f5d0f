use std::sync::Arc;

use crate::{config::Config, store::FileStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<FileStore>,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = FileStore::new(&config.store.data_dir, &config.store.backup_dir);
        let created = store.seed_missing().await?;
        if created > 0 {
            tracing::info!("seeded {} missing data files", created);
        }

        Ok(Self {
            store: Arc::new(store),
            config,
        })
    }
}
