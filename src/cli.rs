//! Command-line interface definitions for dental_ai_news.
//!
//! No argument is required: a bare invocation runs the built-in
//! configuration and reads the API key from `NEWS_API_KEY`.

use chrono::NaiveDate;
use clap::Parser;

/// Command-line arguments for dental_ai_news.
///
/// # Examples
///
/// ```sh
/// # Defaults: English and Spanish digests under ./noticias
/// NEWS_API_KEY=... dental_ai_news
///
/// # Custom configuration and output root
/// dental_ai_news -c digest.yaml -o ./site/news
///
/// # Regenerate a specific day's file
/// dental_ai_news --date 2025-05-06
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// NewsAPI key
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub news_api_key: Option<String>,

    /// Root directory for the Markdown digests (overrides the config file)
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Digest date in YYYY-MM-DD; defaults to today's local date
    #[arg(long)]
    pub date: Option<NaiveDate>,
}
