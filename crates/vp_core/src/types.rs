use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::Error;

pub const DEFAULT_LIST_LIMIT: usize = 20;

/// Topical label assigned to an article by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Saisie,
    Brevet,
    Marque,
    Judiciaire,
    Copyright,
    General,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Saisie,
        Category::Brevet,
        Category::Marque,
        Category::Judiciaire,
        Category::Copyright,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Saisie => "saisie",
            Category::Brevet => "brevet",
            Category::Marque => "marque",
            Category::Judiciaire => "judiciaire",
            Category::Copyright => "copyright",
            Category::General => "general",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::InvalidValue(format!("Unknown category: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Fr,
    En,
    Es,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Fr => "fr",
            Language::En => "en",
            Language::Es => "es",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fr" => Ok(Language::Fr),
            "en" => Ok(Language::En),
            "es" => Ok(Language::Es),
            other => Err(Error::InvalidValue(format!("Unknown language: {}", other))),
        }
    }
}

/// A raw provider hit, normalized but not yet classified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub title: String,
    pub description: String,
    pub url: String,
    pub source: String,
    pub published_at: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArticle {
    pub url: String,
    pub title: String,
    pub summary: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub image_url: Option<String>,
    pub category: Category,
    pub keywords: Vec<String>,
    pub language: Language,
    pub relevance_score: i32,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub summary: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub image_url: Option<String>,
    pub category: Category,
    pub keywords: Vec<String>,
    pub language: Language,
    pub relevance_score: i32,
    pub is_highlight: bool,
    pub user_id: String,
    pub scraped_at: DateTime<Utc>,
}

impl Article {
    /// Materialize a row for `new`, stamped with a fresh id and `scraped_at = now`.
    pub fn from_new(new: NewArticle) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: new.url,
            title: new.title,
            summary: new.summary,
            source: new.source,
            published_at: new.published_at,
            image_url: new.image_url,
            category: new.category,
            keywords: new.keywords,
            language: new.language,
            relevance_score: new.relevance_score,
            is_highlight: false,
            user_id: new.user_id,
            scraped_at: Utc::now(),
        }
    }
}

/// Filter for listing stored articles, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleQuery {
    pub limit: usize,
    pub category: Option<Category>,
    pub language: Option<Language>,
}

impl Default for ArticleQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIST_LIMIT,
            category: None,
            language: None,
        }
    }
}

impl ArticleQuery {
    pub fn matches(&self, article: &Article) -> bool {
        self.category.map_or(true, |c| article.category == c)
            && self.language.map_or(true, |l| article.language == l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_labels_round_trip() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert!("Test".parse::<Category>().is_err());
    }

    #[test]
    fn test_article_serializes_camel_case() {
        let article = Article::from_new(NewArticle {
            url: "https://example.com/a".to_string(),
            title: "Saisie record".to_string(),
            summary: "".to_string(),
            source: "example.com".to_string(),
            published_at: Utc::now(),
            image_url: None,
            category: Category::Saisie,
            keywords: vec!["saisie".to_string()],
            language: Language::Fr,
            relevance_score: 0,
            user_id: "user".to_string(),
        });

        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["category"], "saisie");
        assert_eq!(json["language"], "fr");
        assert_eq!(json["relevanceScore"], 0);
        assert_eq!(json["isHighlight"], false);
        assert!(json.get("publishedAt").is_some());
    }

    #[test]
    fn test_query_filters() {
        let mut article = Article::from_new(NewArticle {
            url: "https://example.com/b".to_string(),
            title: "Patent".to_string(),
            summary: "".to_string(),
            source: "example.com".to_string(),
            published_at: Utc::now(),
            image_url: None,
            category: Category::Brevet,
            keywords: vec![],
            language: Language::En,
            relevance_score: 0,
            user_id: "user".to_string(),
        });

        let query = ArticleQuery {
            category: Some(Category::Brevet),
            ..Default::default()
        };
        assert!(query.matches(&article));

        article.language = Language::Es;
        let query = ArticleQuery {
            language: Some(Language::En),
            ..Default::default()
        };
        assert!(!query.matches(&article));
    }
}
