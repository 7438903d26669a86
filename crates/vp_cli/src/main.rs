use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use vp_core::{Article, ArticleQuery, ArticleStorage, Category, Config, Error, Language, Result};
use vp_search::{handle_command, BraveClient, WatchArgs, WatchConfig, WatchManager};
use vp_web::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                let unit_seconds = match c {
                    's' => 1,
                    'm' => 60,
                    'h' => 3600,
                    'd' => 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                total_seconds = num
                    .checked_mul(unit_seconds)
                    .and_then(|secs| total_seconds.checked_add(secs))
                    .ok_or_else(|| "Duration is too large".to_string())?;
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // A trailing bare number counts as seconds
        if !current_number.is_empty() {
            let secs = current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total_seconds = total_seconds
                .checked_add(secs)
                .ok_or_else(|| "Duration is too large".to_string())?;
            has_unit = true;
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }
        if total_seconds == 0 {
            return Err("Duration must be greater than zero".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Intellectual-property news watch", long_about = None)]
pub struct Cli {
    /// Overrides DATABASE_URL (`memory` or `sqlite://path.db`)
    #[arg(long, global = true)]
    database_url: Option<String>,
    /// Overrides BRAVE_API_KEY
    #[arg(long, global = true)]
    api_key: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Search the provider and store new articles
    Watch {
        #[command(flatten)]
        args: WatchArgs,
        /// Repeat the watch forever with this pause between runs (e.g. 1h, 30m, 1h15m30s)
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    /// Print stored articles, newest first
    List {
        #[arg(long, default_value_t = vp_core::types::DEFAULT_LIST_LIMIT)]
        limit: usize,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        language: Option<String>,
    },
    /// Verify the storage connection
    Check,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::from_env()?;
    if let Some(url) = &cli.database_url {
        config.database_url = url.clone();
    }
    if let Some(key) = &cli.api_key {
        config.brave_api_key = Some(key.clone()).filter(|k| !k.trim().is_empty());
    }
    Ok(config)
}

fn format_article(article: &Article) -> String {
    format!(
        "{} [{}/{}] {} - {}\n    {}",
        article.published_at.format("%Y-%m-%d %H:%M"),
        article.category,
        article.language,
        article.title,
        article.source,
        article.url
    )
}

async fn run_watch(
    args: WatchArgs,
    interval: Option<HumanDuration>,
    config: &Config,
    storage: Arc<dyn ArticleStorage>,
) -> Result<()> {
    let search = Arc::new(BraveClient::from_config(config)?);
    let manager = WatchManager::new(search, storage, WatchConfig::from_config(config));

    match interval {
        Some(interval) => {
            info!("Running in periodic mode with {}s interval", interval.0.as_secs());
            loop {
                info!("Starting watch cycle");
                if let Err(e) = handle_command(args.clone(), &manager).await {
                    error!("Error during watch: {}", e);
                }
                info!("Waiting {}s before next watch", interval.0.as_secs());
                tokio::time::sleep(interval.0).await;
            }
        }
        None => {
            handle_command(args, &manager).await?;
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    vp_search::init_logging("info");
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    info!("💾 Opening storage at {}", config.database_url);
    let storage = vp_storage::create_storage(&config.database_url).await?;

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.host.clone());
            let port = port.unwrap_or(config.port);
            let addr: SocketAddr = format!("{}:{}", host, port)
                .parse()
                .map_err(|e| Error::Configuration(format!("Invalid listen address {}:{}: {}", host, port, e)))?;

            let state = AppState::from_config(&config, storage)?;
            if state.search.is_none() {
                info!("⚠️ No Brave API key configured, watch and live search will answer with an error");
            }
            vp_web::serve(state, addr).await?;
        }
        Commands::Watch { args, interval } => {
            run_watch(args, interval, &config, storage).await?;
        }
        Commands::List { limit, category, language } => {
            let query = ArticleQuery {
                limit,
                category: category.as_deref().map(str::parse::<Category>).transpose()?,
                language: language.as_deref().map(str::parse::<Language>).transpose()?,
            };
            let articles = storage.list(&query).await?;
            for article in &articles {
                println!("{}", format_article(article));
            }
            println!("{} articles", articles.len());
        }
        Commands::Check => {
            let count = storage.count().await?;
            info!("✨ Storage reachable, {} articles stored", count);
            println!("ok ({} articles)", count);
        }
    }

    Ok(())
}
