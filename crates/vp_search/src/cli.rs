use clap::Args;
use vp_core::Result;

use crate::manager::{WatchManager, WatchReport, WatchRequest};

#[derive(Args, Debug, Clone, Default)]
pub struct WatchArgs {
    /// Keyword to search for; repeat for several. Defaults to the built-in watch list.
    #[arg(short, long = "keyword")]
    pub keywords: Vec<String>,

    /// Maximum results requested per keyword (default 5, capped at 50)
    #[arg(short, long)]
    pub max_results: Option<u32>,
}

impl From<WatchArgs> for WatchRequest {
    fn from(args: WatchArgs) -> Self {
        WatchRequest {
            keywords: (!args.keywords.is_empty()).then_some(args.keywords),
            max_results: args.max_results,
        }
    }
}

pub fn render_report(report: &WatchReport) -> String {
    let stats = &report.stats;
    let mut lines = vec![format!(
        "📊 found {} / unique {} / saved {} / skipped {} / errors {} / failed {}",
        stats.total_found, stats.unique, stats.saved, stats.skipped, stats.errors, stats.failed
    )];

    for article in &report.articles {
        let tags = if article.keywords.is_empty() {
            String::new()
        } else {
            format!(" [{}]", article.keywords.join(", "))
        };
        lines.push(format!("🆕 ({}) {} - {}{}", article.category, article.title, article.source, tags));
    }
    for error in &report.errors {
        lines.push(format!("❌ {}", error));
    }

    lines.join("\n")
}

pub async fn handle_command(args: WatchArgs, manager: &WatchManager) -> Result<WatchReport> {
    let report = manager.run(args.into()).await?;
    println!("{}", render_report(&report));
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::{SavedArticle, WatchStats};
    use uuid::Uuid;
    use vp_core::Category;

    #[test]
    fn test_args_into_request() {
        let request: WatchRequest = WatchArgs::default().into();
        assert!(request.keywords.is_none());

        let request: WatchRequest = WatchArgs {
            keywords: vec!["wipo".to_string()],
            max_results: Some(3),
        }
        .into();
        assert_eq!(request.keywords, Some(vec!["wipo".to_string()]));
        assert_eq!(request.max_results, Some(3));
    }

    #[test]
    fn test_render_report() {
        let report = WatchReport {
            success: true,
            stats: WatchStats { total_found: 2, unique: 1, saved: 1, ..Default::default() },
            articles: vec![SavedArticle {
                id: Uuid::new_v4(),
                title: "Saisie record".to_string(),
                source: "example.fr".to_string(),
                category: Category::Saisie,
                keywords: vec!["saisie".to_string()],
            }],
            errors: vec!["brevet: Provider error (429): slow down".to_string()],
        };

        let rendered = render_report(&report);
        assert!(rendered.contains("saved 1"));
        assert!(rendered.contains("🆕 (saisie) Saisie record - example.fr [saisie]"));
        assert!(rendered.contains("❌ brevet: Provider error (429)"));
    }
}
