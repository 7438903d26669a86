use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};
use uuid::Uuid;
use vp_core::config::DEFAULT_USER_ID;
use vp_core::{ArticleStorage, Category, NewArticle, NewsSearch, Result, SearchResult};

use crate::classifier::{categorize, detect_language, extract_keywords};
use crate::logging::Logger;
use crate::providers::parse_published_at;

/// Watch keywords used when the caller supplies none.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "contrefaçon",
    "saisie douane contrefaçon",
    "brevet propriété intellectuelle",
    "marque contrefaçon",
    "contrefaçon produits",
    "customs seizure counterfeit",
    "intellectual property infringement",
    "ompic maroc contrefaçon",
    "douane maroc saisie",
    "euipo counterfeit",
    "wipo counterfeiting",
];

pub const DEFAULT_MAX_RESULTS: u32 = 5;
pub const MAX_RESULTS_CAP: u32 = 50;

#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Pause between two consecutive provider calls
    pub delay: Duration,
    pub default_user_id: String,
    pub default_max_results: u32,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(2),
            default_user_id: DEFAULT_USER_ID.to_string(),
            default_max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl WatchConfig {
    pub fn from_config(config: &vp_core::Config) -> Self {
        Self {
            delay: config.request_delay,
            default_user_id: config.default_user_id.clone(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchRequest {
    pub keywords: Option<Vec<String>>,
    pub max_results: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchStats {
    pub total_found: usize,
    pub unique: usize,
    pub saved: usize,
    pub skipped: usize,
    pub errors: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedArticle {
    pub id: Uuid,
    pub title: String,
    pub source: String,
    pub category: Category,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WatchReport {
    pub success: bool,
    pub stats: WatchStats,
    pub articles: Vec<SavedArticle>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Collapse results sharing a URL. The last one seen wins but keeps the
/// position of the first sighting.
pub fn dedupe_by_url(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<SearchResult> = Vec::with_capacity(results.len());

    for result in results {
        match positions.get(&result.url) {
            Some(&i) => unique[i] = result,
            None => {
                positions.insert(result.url.clone(), unique.len());
                unique.push(result);
            }
        }
    }
    unique
}

pub struct WatchManager {
    search: Arc<dyn NewsSearch>,
    storage: Arc<dyn ArticleStorage>,
    config: WatchConfig,
}

impl WatchManager {
    pub fn new(search: Arc<dyn NewsSearch>, storage: Arc<dyn ArticleStorage>, config: WatchConfig) -> Self {
        Self { search, storage, config }
    }

    fn resolve_keywords(&self, keywords: Option<Vec<String>>) -> Vec<String> {
        let keywords: Vec<String> = keywords
            .unwrap_or_default()
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        if keywords.is_empty() {
            DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect()
        } else {
            keywords
        }
    }

    fn resolve_max_results(&self, max_results: Option<u32>) -> u32 {
        match max_results {
            Some(n) if n > 0 => n.min(MAX_RESULTS_CAP),
            _ => self.config.default_max_results,
        }
    }

    /// Search every keyword in turn, one call at a time with `delay` between
    /// calls. A failing keyword is recorded and skipped.
    async fn collect(&self, keywords: &[String], max_results: u32) -> (Vec<SearchResult>, Vec<String>) {
        let mut found = Vec::new();
        let mut errors = Vec::new();

        for (i, keyword) in keywords.iter().enumerate() {
            let logger = Logger::new().with_prefix(format!("[{}/{}]", i + 1, keywords.len()));
            if i > 0 && !self.config.delay.is_zero() {
                sleep(self.config.delay).await;
            }

            logger.info(&format!("🔍 Searching {:?}", keyword));
            match self.search.search(keyword, max_results).await {
                Ok(results) => {
                    logger.info(&format!("✅ {} results for {:?}", results.len(), keyword));
                    found.extend(results);
                }
                Err(e) => {
                    logger.error(&format!("❌ Search failed for {:?}: {}", keyword, e));
                    errors.push(format!("{}: {}", keyword, e));
                }
            }
        }

        (found, errors)
    }

    async fn save(&self, result: SearchResult) -> Result<Option<SavedArticle>> {
        if self.storage.find_by_url(&result.url).await?.is_some() {
            return Ok(None);
        }

        let article = NewArticle {
            category: categorize(&result.title, &result.description),
            keywords: extract_keywords(&result.title, &result.description),
            language: detect_language(&result.title),
            published_at: parse_published_at(&result.published_at, Utc::now()),
            url: result.url,
            title: result.title,
            summary: result.description,
            source: result.source,
            image_url: result.image_url,
            relevance_score: 0,
            user_id: self.config.default_user_id.clone(),
        };

        let saved = self.storage.create(article).await?;
        Ok(Some(SavedArticle {
            id: saved.id,
            title: saved.title,
            source: saved.source,
            category: saved.category,
            keywords: saved.keywords,
        }))
    }

    pub async fn run(&self, request: WatchRequest) -> Result<WatchReport> {
        let keywords = self.resolve_keywords(request.keywords);
        let max_results = self.resolve_max_results(request.max_results);
        info!("🚀 Starting watch over {} keywords using {}", keywords.len(), self.search.name());

        let (found, errors) = self.collect(&keywords, max_results).await;
        let total_found = found.len();
        let unique = dedupe_by_url(found);
        info!("📊 {} unique articles out of {} results", unique.len(), total_found);

        let mut stats = WatchStats {
            total_found,
            unique: unique.len(),
            errors: errors.len(),
            ..Default::default()
        };
        let mut articles = Vec::new();

        for result in unique {
            let title = result.title.clone();
            match self.save(result).await {
                Ok(Some(saved)) => articles.push(saved),
                Ok(None) => stats.skipped += 1,
                Err(e) => {
                    error!("❌ Failed to save article {:?}: {}", title, e);
                    stats.failed += 1;
                }
            }
        }
        stats.saved = articles.len();

        info!("💾 {} articles saved, {} skipped (duplicates)", stats.saved, stats.skipped);

        Ok(WatchReport {
            success: true,
            stats,
            articles,
            errors,
        })
    }
}
