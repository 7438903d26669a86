use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use tracing::debug;
use url::Url;
use vp_core::{Error, NewsSearch, Result, SearchResult};
use vp_core::config::DEFAULT_BRAVE_API_URL;

use super::{hostname, UNKNOWN_SOURCE};

#[derive(Debug, Default, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    results: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct NewsItem {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    source: Option<String>,
    page_age: Option<String>,
    age: Option<String>,
    meta_url: Option<MetaUrl>,
    thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Default, Deserialize)]
struct MetaUrl {
    hostname: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnail {
    src: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl NewsItem {
    fn into_search_result(self) -> SearchResult {
        let url = self.url.unwrap_or_default();
        let source = non_empty(self.meta_url.and_then(|m| m.hostname))
            .or_else(|| non_empty(self.source))
            .or_else(|| hostname(&url))
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());
        let published_at = non_empty(self.page_age)
            .or_else(|| non_empty(self.age))
            .unwrap_or_else(|| Utc::now().to_rfc3339());

        SearchResult {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            url,
            source,
            published_at,
            image_url: non_empty(self.thumbnail.and_then(|t| t.src)),
        }
    }
}

/// Map a raw news search payload onto normalized results.
///
/// A payload without a `results` array yields no results; individual entries
/// that are not objects are skipped.
pub fn parse_results(body: &str) -> Result<Vec<SearchResult>> {
    let response: NewsResponse = serde_json::from_str(body)?;
    let items = match response.results {
        Some(serde_json::Value::Array(items)) => items,
        _ => return Ok(vec![]),
    };

    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<NewsItem>(item).ok())
        .map(NewsItem::into_search_result)
        .collect())
}

pub struct BraveClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl fmt::Debug for BraveClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BraveClient")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl BraveClient {
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Result<Self> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Configuration("Brave Search API key is required".to_string()))?;

        let base_url = base_url.unwrap_or_else(|| DEFAULT_BRAVE_API_URL.to_string());
        Url::parse(&base_url).map_err(|e| Error::InvalidUrl(format!("{}: {}", base_url, e)))?;

        Ok(Self {
            client: Client::new(),
            api_key,
            base_url,
        })
    }

    pub fn from_config(config: &vp_core::Config) -> Result<Self> {
        Self::new(config.brave_api_key.clone(), Some(config.brave_api_url.clone()))
    }
}

#[async_trait]
impl NewsSearch for BraveClient {
    fn name(&self) -> &str {
        "Brave Search"
    }

    async fn search(&self, query: &str, count: u32) -> Result<Vec<SearchResult>> {
        let count = count.to_string();
        let response = self.client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("count", count.as_str()),
                ("search_lang", "fr"),
                ("text_decorations", "false"),
                ("safesearch", "strict"),
            ])
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let results = parse_results(&body).map_err(|e| match e {
            Error::Serialization(_) => Error::Provider {
                status: status.as_u16(),
                body: format!("malformed response: {}", e),
            },
            other => other,
        })?;
        debug!("{} returned {} results for {:?}", self.name(), results.len(), query);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn test_missing_key_is_configuration_error() {
        assert!(matches!(BraveClient::new(None, None), Err(Error::Configuration(_))));
        assert!(matches!(BraveClient::new(Some("  ".to_string()), None), Err(Error::Configuration(_))));
        assert!(BraveClient::new(Some("key".to_string()), None).is_ok());
    }

    #[test]
    fn test_bad_base_url_is_rejected() {
        let client = BraveClient::new(Some("key".to_string()), Some("not a url".to_string()));
        assert!(matches!(client, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_source_host_consistent_across_fields() {
        let body = r#"{ "results": [
            { "url": "https://www.lemonde.fr/a", "meta_url": { "hostname": "www.lemonde.fr" } },
            { "url": "https://www.lemonde.fr/b" }
        ] }"#;

        let results = parse_results(body).unwrap();
        assert_eq!(results[0].source, "www.lemonde.fr");
        assert_eq!(results[1].source, results[0].source);
    }

    #[tokio::test]
    async fn test_non_json_body_is_provider_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            use tokio::io::{AsyncReadExt, AsyncWriteExt};
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let body = "<html>maintenance</html>";
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });

        let client = BraveClient::new(Some("key".to_string()), Some(format!("http://{}/news", addr))).unwrap();
        let err = client.search("contrefaçon", 5).await.unwrap_err();
        assert!(matches!(err, Error::Provider { status: 200, .. }));
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = BraveClient::new(Some("secret-token".to_string()), None).unwrap();
        assert!(!format!("{:?}", client).contains("secret-token"));
    }

    #[test]
    fn test_parse_full_result() {
        let body = r#"{
            "type": "news",
            "results": [{
                "title": "Saisie record de contrefaçons au port de Marseille",
                "description": "La douane a intercepté 2 tonnes de produits.",
                "url": "https://www.example.fr/saisie",
                "age": "2 hours ago",
                "page_age": "2024-05-01T08:30:00",
                "meta_url": { "hostname": "www.example.fr" },
                "thumbnail": { "src": "https://imgs.example/thumb.jpg" }
            }]
        }"#;

        let results = parse_results(body).unwrap();
        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.source, "www.example.fr");
        assert_eq!(result.published_at, "2024-05-01T08:30:00");
        assert_eq!(result.image_url.as_deref(), Some("https://imgs.example/thumb.jpg"));
    }

    #[test]
    fn test_parse_defaults_missing_fields() {
        let body = r#"{ "results": [{ "url": "https://news.example.com/a" }, {}] }"#;

        let results = parse_results(body).unwrap();
        assert_eq!(results.len(), 2);

        let first = &results[0];
        assert_eq!(first.title, "");
        assert_eq!(first.description, "");
        assert_eq!(first.source, "news.example.com");
        assert!(first.image_url.is_none());
        assert!(DateTime::parse_from_rfc3339(&first.published_at).is_ok());

        let second = &results[1];
        assert_eq!(second.url, "");
        assert_eq!(second.source, UNKNOWN_SOURCE);
    }

    #[test]
    fn test_parse_without_results_array() {
        assert!(parse_results(r#"{ "type": "news" }"#).unwrap().is_empty());
        assert!(parse_results(r#"{ "results": "nope" }"#).unwrap().is_empty());
        assert!(matches!(parse_results("<html>"), Err(Error::Serialization(_))));
    }
}
