use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use vp_core::{Article, ArticleQuery, ArticleStorage, Error, NewArticle, Result};
use crate::StorageBackend;

#[derive(Default)]
pub struct MemoryStore {
    articles: Vec<Article>,
}

impl MemoryStore {
    pub fn find_by_url(&self, url: &str) -> Option<&Article> {
        self.articles.iter().find(|a| a.url == url)
    }

    pub fn insert(&mut self, article: NewArticle) -> Result<Article> {
        if self.find_by_url(&article.url).is_some() {
            return Err(Error::Storage(format!("Article already exists: {}", article.url)));
        }
        let article = Article::from_new(article);
        self.articles.push(article.clone());
        Ok(article)
    }

    pub fn list(&self, query: &ArticleQuery) -> Vec<Article> {
        let mut articles = self.articles.iter()
            .filter(|a| query.matches(a))
            .cloned()
            .collect::<Vec<_>>();
        articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        articles.truncate(query.limit);
        articles
    }
}

#[derive(Clone, Default)]
pub struct InMemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
    fn name() -> &'static str {
        "memory"
    }

    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn connect(_url: &str) -> Result<Self> {
        Ok(Self::new())
    }
}

#[async_trait]
impl ArticleStorage for InMemoryStorage {
    async fn find_by_url(&self, url: &str) -> Result<Option<Article>> {
        let store = self.store.read().await;
        Ok(store.find_by_url(url).cloned())
    }

    async fn create(&self, article: NewArticle) -> Result<Article> {
        let mut store = self.store.write().await;
        store.insert(article)
    }

    async fn list(&self, query: &ArticleQuery) -> Result<Vec<Article>> {
        let store = self.store.read().await;
        Ok(store.list(query))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.store.read().await.articles.len())
    }
}
