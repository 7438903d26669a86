use std::sync::Arc;
use vp_core::{ArticleStorage, Config, Error, NewsSearch, Result};
use vp_search::{BraveClient, WatchConfig, WatchManager};

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn ArticleStorage>,
    /// Absent when no provider API key is configured
    pub search: Option<Arc<dyn NewsSearch>>,
    pub watch_config: WatchConfig,
}

impl AppState {
    pub fn from_config(config: &Config, storage: Arc<dyn ArticleStorage>) -> Result<Self> {
        let search = match config.brave_api_key {
            Some(_) => Some(Arc::new(BraveClient::from_config(config)?) as Arc<dyn NewsSearch>),
            None => None,
        };

        Ok(Self {
            storage,
            search,
            watch_config: WatchConfig::from_config(config),
        })
    }

    pub fn search(&self) -> Result<Arc<dyn NewsSearch>> {
        self.search
            .clone()
            .ok_or_else(|| Error::Configuration("Brave Search API key is not configured".to_string()))
    }

    pub fn watch_manager(&self) -> Result<WatchManager> {
        Ok(WatchManager::new(self.search()?, self.storage.clone(), self.watch_config.clone()))
    }
}
