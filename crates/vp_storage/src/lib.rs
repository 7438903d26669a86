use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;
use vp_core::{ArticleStorage, Error, Result};

pub mod backends;

pub use backends::*;

#[async_trait]
pub trait StorageBackend: Sized + Send + Sync {
    fn name() -> &'static str;
    fn get_error_message() -> &'static str;
    async fn connect(url: &str) -> Result<Self>;
}

/// Pick a backend from the database URL: `memory` or `sqlite:...`.
pub async fn create_storage(database_url: &str) -> Result<Arc<dyn ArticleStorage>> {
    let url = database_url.trim();

    if url == "memory" || url.starts_with("memory:") {
        return connect::<InMemoryStorage>(url).await;
    }

    #[cfg(feature = "sqlite")]
    {
        if url.starts_with("sqlite:") {
            return connect::<SqliteStorage>(url).await;
        }
    }

    Err(Error::Configuration(format!("Unsupported database URL: {}", url)))
}

async fn connect<T: StorageBackend + ArticleStorage + 'static>(url: &str) -> Result<Arc<dyn ArticleStorage>> {
    let storage = T::connect(url).await.map_err(|e| {
        Error::Configuration(format!("{} ({})", e, T::get_error_message()))
    })?;
    info!("🏦 Storage backend ready (using {})", T::name());
    Ok(Arc::new(storage))
}
