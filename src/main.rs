//! # dental_ai_news
//!
//! Collects news about artificial intelligence in dentistry from the NewsAPI
//! search endpoint and writes dated Markdown digests, one per output language.
//!
//! ## Usage
//!
//! ```sh
//! NEWS_API_KEY=... dental_ai_news
//! ```
//!
//! ## Architecture
//!
//! Each invocation runs one sequential pipeline:
//! 1. **Fetching**: One search request per configured query
//! 2. **Filtering**: Keep articles that mention both AI and dentistry
//! 3. **Deduplication**: First occurrence per URL wins
//! 4. **Translation**: Best-effort titles and descriptions for translated outputs
//! 5. **Output**: Overwrite `<output_root>/<lang>/<YYYY-MM-DD>.md`

use chrono::Local;
use clap::Parser;
use reqwest::Client;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod filters;
mod models;
mod outputs;
mod pipeline;
mod translate;
mod utils;

use api::NewsApiClient;
use cli::Cli;
use config::DigestConfig;
use pipeline::RunSummary;
use translate::GoogleTranslator;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("dental_ai_news starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.output_dir, ?args.date, "Parsed CLI arguments");

    let Some(summary) = execute(args).await? else {
        return Ok(());
    };

    for output in &summary.outputs {
        match &output.result {
            Ok(path) => info!(
                language = %output.language,
                path = %path.display(),
                translation_fallbacks = output.translation_fallbacks,
                "Digest written"
            ),
            Err(e) => warn!(
                language = %output.language,
                dir = %output.dir.display(),
                error = %e,
                "Digest not written"
            ),
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        date = %summary.date,
        fetched = summary.fetched,
        relevant = summary.relevant,
        unique = summary.unique,
        all_written = summary.all_written(),
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

/// The API key, unless it is absent or blank.
fn api_key(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|k| !k.is_empty())
}

/// Load the configuration and run the pipeline once.
///
/// Returns `Ok(None)` without touching the filesystem when no API key is set.
#[instrument(level = "info", skip_all)]
async fn execute(args: Cli) -> Result<Option<RunSummary>, Box<dyn Error>> {
    let mut config = DigestConfig::load(args.config.as_deref().map(Path::new))?;
    if let Some(dir) = &args.output_dir {
        config.output_root = PathBuf::from(dir);
    }

    let Some(api_key) = api_key(args.news_api_key.as_deref()) else {
        error!("NEWS_API_KEY is not set; nothing fetched and no files written");
        return Ok(None);
    };

    let today = args.date.unwrap_or_else(|| Local::now().date_naive());
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let http = Client::builder().timeout(timeout).build()?;

    let source = NewsApiClient::new(http.clone(), api_key, &config);
    let translator = GoogleTranslator::new(http, &config.translate_url, timeout);

    Ok(Some(pipeline::run(&config, &source, &translator, today).await))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(root: &Path, key: Option<&str>) -> Cli {
        Cli {
            config: None,
            news_api_key: key.map(String::from),
            output_dir: Some(root.join("noticias").display().to_string()),
            date: None,
        }
    }

    #[test]
    fn test_api_key_rejects_blank() {
        assert_eq!(api_key(None), None);
        assert_eq!(api_key(Some("   ")), None);
        assert_eq!(api_key(Some(" abc ")), Some("abc"));
    }

    #[tokio::test]
    async fn test_missing_key_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();

        let summary = execute(cli(tmp.path(), None)).await.unwrap();

        assert!(summary.is_none());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_blank_key_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();

        let summary = execute(cli(tmp.path(), Some("  \t"))).await.unwrap();

        assert!(summary.is_none());
        assert!(!tmp.path().join("noticias").exists());
    }
}
