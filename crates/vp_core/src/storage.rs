use async_trait::async_trait;
use crate::types::{Article, ArticleQuery, NewArticle};
use crate::Result;

#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Look up an article by its URL
    async fn find_by_url(&self, url: &str) -> Result<Option<Article>>;

    /// Insert a new article. Fails if the URL is already stored.
    async fn create(&self, article: NewArticle) -> Result<Article>;

    /// Stored articles matching the query, newest first
    async fn list(&self, query: &ArticleQuery) -> Result<Vec<Article>>;

    async fn count(&self) -> Result<usize>;
}
