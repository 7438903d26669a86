use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::time::sleep;
use tracing::info;
use vp_core::types::DEFAULT_LIST_LIMIT;
use vp_core::{Article, ArticleQuery, Category, Language, SearchResult};
use vp_search::{WatchReport, WatchRequest};

use crate::{AppError, AppState};

pub const DEFAULT_LIVE_QUERY: &str = "contrefaçon saisie douane";
pub const LIVE_RESULT_COUNT: u32 = 10;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<String>,
    pub category: Option<String>,
    pub language: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl ListParams {
    pub fn into_query(self) -> Result<ArticleQuery, AppError> {
        Ok(ArticleQuery {
            limit: non_empty(self.limit.as_deref())
                .and_then(|l| l.parse().ok())
                .unwrap_or(DEFAULT_LIST_LIMIT),
            category: non_empty(self.category.as_deref()).map(str::parse::<Category>).transpose()?,
            language: non_empty(self.language.as_deref()).map(str::parse::<Language>).transpose()?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ArticleList {
    pub success: bool,
    pub count: usize,
    pub articles: Vec<Article>,
}

#[derive(Debug, Serialize)]
pub struct LiveSearch {
    pub success: bool,
    pub query: String,
    pub count: usize,
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// `POST /api/veille`: run a watch. An absent or malformed body means defaults.
pub async fn trigger_watch(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<WatchReport>, AppError> {
    let manager = state.watch_manager()?;
    let request: WatchRequest = serde_json::from_slice(&body).unwrap_or_default();

    let report = manager.run(request).await?;
    Ok(Json(report))
}

/// `GET /api/veille`: stored articles, newest first.
pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ArticleList>, AppError> {
    let query = params.into_query()?;
    let articles = state.storage.list(&query).await?;

    Ok(Json(ArticleList {
        success: true,
        count: articles.len(),
        articles,
    }))
}

/// `GET /api/search`: query the provider directly without storing anything.
/// Waits the watch delay first so back-to-back calls respect the rate limit.
pub async fn live_search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<LiveSearch>, AppError> {
    let search = state.search()?;
    let query = non_empty(params.q.as_deref()).unwrap_or(DEFAULT_LIVE_QUERY).to_string();

    if !state.watch_config.delay.is_zero() {
        sleep(state.watch_config.delay).await;
    }
    info!("🔍 Live search for {:?}", query);
    let results = search.search(&query, LIVE_RESULT_COUNT).await?;

    Ok(Json(LiveSearch {
        success: true,
        query,
        count: results.len(),
        results,
    }))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let articles = state.storage.count().await?;
    Ok(Json(json!({ "status": "ok", "articles": articles })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_defaults() {
        let query = ListParams::default().into_query().unwrap();
        assert_eq!(query, ArticleQuery::default());

        let query = ListParams {
            limit: Some("abc".to_string()),
            category: Some("".to_string()),
            language: None,
        }
        .into_query()
        .unwrap();
        assert_eq!(query.limit, DEFAULT_LIST_LIMIT);
        assert!(query.category.is_none());
    }

    #[test]
    fn test_list_params_parsing() {
        let query = ListParams {
            limit: Some("5".to_string()),
            category: Some("brevet".to_string()),
            language: Some("en".to_string()),
        }
        .into_query()
        .unwrap();
        assert_eq!(query.limit, 5);
        assert_eq!(query.category, Some(Category::Brevet));
        assert_eq!(query.language, Some(Language::En));

        let err = ListParams {
            category: Some("Test".to_string()),
            ..Default::default()
        }
        .into_query();
        assert!(err.is_err());
    }
}
