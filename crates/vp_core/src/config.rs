use std::{env, fmt::Display, str::FromStr, time::Duration};

use tracing::info;

use crate::{Error, Result};

pub const DEFAULT_BRAVE_API_URL: &str = "https://api.search.brave.com/res/v1/news/search";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://veillepi.db";
pub const DEFAULT_USER_ID: &str = "nihel-eabpa-001";

#[derive(Clone)]
pub struct Config {
    pub brave_api_key: Option<String>,
    pub brave_api_url: String,
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub request_delay: Duration,
    pub default_user_id: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("brave_api_key", &self.brave_api_key.as_deref().map(|_| "<redacted>"))
            .field("brave_api_url", &self.brave_api_url)
            .field("database_url", &self.database_url)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("request_delay", &self.request_delay)
            .field("default_user_id", &self.default_user_id)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            brave_api_key: None,
            brave_api_url: DEFAULT_BRAVE_API_URL.to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            request_delay: Duration::from_secs(2),
            default_user_id: DEFAULT_USER_ID.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let brave_api_key = var("BRAVE_API_KEY");
        if brave_api_key.is_none() {
            info!("BRAVE_API_KEY not set, watch runs will be refused");
        }

        Ok(Self {
            brave_api_key,
            brave_api_url: var("BRAVE_API_URL").unwrap_or(defaults.brave_api_url),
            database_url: load_or("DATABASE_URL", var("DATABASE_URL"), defaults.database_url)?,
            host: load_or("VP_HOST", var("VP_HOST"), defaults.host)?,
            port: load_or("VP_PORT", var("VP_PORT"), defaults.port)?,
            request_delay: Duration::from_millis(load_or(
                "VP_REQUEST_DELAY_MS",
                var("VP_REQUEST_DELAY_MS"),
                defaults.request_delay.as_millis() as u64,
            )?),
            default_user_id: load_or("VP_DEFAULT_USER", var("VP_DEFAULT_USER"), defaults.default_user_id)?,
        })
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.brave_api_key
            .as_deref()
            .ok_or_else(|| Error::Configuration("BRAVE_API_KEY is not configured".to_string()))
    }
}

fn load_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match raw {
        Some(value) => value
            .parse()
            .map_err(|e| Error::Configuration(format!("Invalid {key} value {value:?}: {e}"))),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert!(config.brave_api_key.is_none());
        assert_eq!(config.port, 3000);
        assert_eq!(config.request_delay, Duration::from_secs(2));
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert!(config.require_api_key().is_err());
    }

    #[test]
    fn test_overrides_and_blank_key() {
        let config = Config::from_lookup(lookup(&[
            ("BRAVE_API_KEY", "   "),
            ("VP_PORT", "8080"),
            ("VP_REQUEST_DELAY_MS", "0"),
            ("DATABASE_URL", "memory"),
        ]))
        .unwrap();
        assert!(config.brave_api_key.is_none());
        assert_eq!(config.port, 8080);
        assert_eq!(config.request_delay, Duration::ZERO);
        assert_eq!(config.database_url, "memory");
    }

    #[test]
    fn test_invalid_port_is_configuration_error() {
        let err = Config::from_lookup(lookup(&[("VP_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = Config::from_lookup(lookup(&[("BRAVE_API_KEY", "secret")])).unwrap();
        assert_eq!(config.require_api_key().unwrap(), "secret");
        assert!(!format!("{:?}", config).contains("secret"));
    }
}
