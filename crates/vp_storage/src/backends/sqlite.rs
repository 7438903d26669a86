use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use uuid::Uuid;
use vp_core::{Article, ArticleQuery, ArticleStorage, Error, NewArticle, Result};
use crate::StorageBackend;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id TEXT PRIMARY KEY,
        url TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        summary TEXT NOT NULL,
        source TEXT NOT NULL,
        published_at TEXT NOT NULL,
        image_url TEXT,
        category TEXT NOT NULL,
        keywords TEXT NOT NULL,
        language TEXT NOT NULL,
        relevance_score INTEGER NOT NULL DEFAULT 0,
        is_highlight INTEGER NOT NULL DEFAULT 0,
        user_id TEXT NOT NULL,
        scraped_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_articles_published_at ON articles (published_at DESC)",
    // Add future migrations here
];

const COLUMNS: &str = "id, url, title, summary, source, published_at, image_url, category, \
                       keywords, language, relevance_score, is_highlight, user_id, scraped_at";

pub struct SqliteStorage {
    pool: SqlitePool,
}

#[async_trait]
impl StorageBackend for SqliteStorage {
    fn name() -> &'static str {
        "sqlite"
    }

    fn get_error_message() -> &'static str {
        "SQLite database should be reachable at DATABASE_URL (e.g. sqlite://veillepi.db)"
    }

    async fn connect(url: &str) -> Result<Self> {
        Self::new_with_url(url).await
    }
}

impl SqliteStorage {
    pub async fn new_with_url(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| Error::storage("Invalid SQLite URL", e))?
            .create_if_missing(true);

        // Every connection to `:memory:` is its own database.
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| Error::storage("Failed to connect to database", e))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::storage(&format!("Failed to run migration {}", i), e))?;
        }

        Ok(Self { pool })
    }
}

/// Fixed-width UTC timestamps so text ordering matches time ordering.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::storage("Failed to parse date", e))
}

fn row_to_article(row: &SqliteRow) -> Result<Article> {
    let id: String = row.get("id");
    let keywords: String = row.get("keywords");
    let category: String = row.get("category");
    let language: String = row.get("language");

    Ok(Article {
        id: Uuid::parse_str(&id).map_err(|e| Error::storage("Invalid article id", e))?,
        url: row.get("url"),
        title: row.get("title"),
        summary: row.get("summary"),
        source: row.get("source"),
        published_at: parse_timestamp(&row.get::<String, _>("published_at"))?,
        image_url: row.get::<Option<String>, _>("image_url"),
        category: category.parse()?,
        keywords: serde_json::from_str(&keywords)?,
        language: language.parse()?,
        relevance_score: row.get("relevance_score"),
        is_highlight: row.get("is_highlight"),
        user_id: row.get("user_id"),
        scraped_at: parse_timestamp(&row.get::<String, _>("scraped_at"))?,
    })
}

#[async_trait]
impl ArticleStorage for SqliteStorage {
    async fn find_by_url(&self, url: &str) -> Result<Option<Article>> {
        let row = sqlx::query(&format!("SELECT {} FROM articles WHERE url = ?", COLUMNS))
            .bind(url)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::storage("Failed to look up article", e))?;

        row.as_ref().map(row_to_article).transpose()
    }

    async fn create(&self, article: NewArticle) -> Result<Article> {
        let article = Article::from_new(article);
        let keywords = serde_json::to_string(&article.keywords)?;

        sqlx::query(
            r#"
            INSERT INTO articles
            (id, url, title, summary, source, published_at, image_url, category,
             keywords, language, relevance_score, is_highlight, user_id, scraped_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(article.id.to_string())
        .bind(&article.url)
        .bind(&article.title)
        .bind(&article.summary)
        .bind(&article.source)
        .bind(format_timestamp(&article.published_at))
        .bind(article.image_url.as_deref())
        .bind(article.category.as_str())
        .bind(keywords)
        .bind(article.language.as_str())
        .bind(article.relevance_score)
        .bind(article.is_highlight)
        .bind(&article.user_id)
        .bind(format_timestamp(&article.scraped_at))
        .execute(&self.pool)
        .await
        .map_err(|e| Error::storage("Failed to store article", e))?;

        Ok(article)
    }

    async fn list(&self, query: &ArticleQuery) -> Result<Vec<Article>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM articles
            WHERE (?1 IS NULL OR category = ?1)
              AND (?2 IS NULL OR language = ?2)
            ORDER BY published_at DESC
            LIMIT ?3
            "#,
            COLUMNS
        ))
        .bind(query.category.map(|c| c.as_str()))
        .bind(query.language.map(|l| l.as_str()))
        .bind(sql_limit(query.limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::storage("Failed to list articles", e))?;

        rows.iter().map(row_to_article).collect()
    }

    async fn count(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::storage("Failed to count articles", e))?;
        Ok(count as usize)
    }
}

/// SQLite reads a negative LIMIT as unbounded, so saturate instead of wrapping.
fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}
