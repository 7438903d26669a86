use async_trait::async_trait;
use crate::types::SearchResult;
use crate::Result;

#[async_trait]
pub trait NewsSearch: Send + Sync {
    fn name(&self) -> &str;

    /// Run a single query against the provider, returning at most `count` results
    async fn search(&self, query: &str, count: u32) -> Result<Vec<SearchResult>>;
}
