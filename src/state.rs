use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::models::Catalog;
use crate::services::cache::LocalCache;
use crate::services::drafts::DraftStore;
use crate::services::remote::RemoteStore;
use crate::services::repository::BookingRepository;

pub struct AppState {
    pub config: AppConfig,
    pub catalog: Arc<Catalog>,
    pub repo: BookingRepository,
    pub drafts: Arc<DraftStore>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        catalog: Catalog,
        cache: Arc<dyn LocalCache>,
        remote: Option<Arc<dyn RemoteStore>>,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let repo = BookingRepository::new(cache, remote);
        let drafts = Arc::new(DraftStore::new(
            repo.clone(),
            Arc::clone(&catalog),
            config.draft_ttl_minutes,
            Duration::from_millis(config.lookup_debounce_ms),
        ));

        Self {
            config,
            catalog,
            repo,
            drafts,
        }
    }
}
