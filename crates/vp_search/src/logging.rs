use std::collections::VecDeque;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Prefixes every message, e.g. `[3/11] 🔍 Searching ...`.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    prefixes: VecDeque<String>,
}

impl Logger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push_back(prefix.into());
        self
    }

    fn prefix(&self) -> String {
        self.prefixes.iter().map(|p| format!("{} ", p)).collect()
    }

    pub fn format(&self, message: &str) -> String {
        format!("{}{}", self.prefix(), message)
    }

    pub fn info(&self, message: &str) {
        tracing::info!("{}", self.format(message));
    }

    pub fn error(&self, message: &str) {
        tracing::error!("{}", self.format(message));
    }
}

/// Install the global fmt subscriber once. `RUST_LOG` overrides `default_filter`.
pub fn init_logging(default_filter: &str) -> Logger {
    if !tracing::dispatcher::has_been_set() {
        INIT.call_once(|| {
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .init();
        });
    }
    Logger::new()
}
