//! News-search API client.
//!
//! This module issues one GET per [`Query`] against the NewsAPI
//! `/v2/everything` endpoint and returns the raw [`Article`] list.
//!
//! # Architecture
//!
//! - [`NewsSource`]: Core trait defining how a query becomes a list of articles
//! - [`NewsApiClient`]: The production implementation backed by `reqwest`
//! - [`fetch_all`]: Runs every query in order and fails soft per query
//!
//! # Failure Policy
//!
//! A query that fails (transport error, timeout, non-2xx, or a non-`"ok"`
//! status) is logged and contributes nothing. There is no retry and no
//! backoff; the remaining queries still run.

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::{DigestConfig, Query};
use crate::models::{Article, NewsApiResponse};
use crate::utils::truncate_for_log;

pub const USER_AGENT: &str = concat!("dental_ai_news/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("API error ({code}): {message}")]
    Api { code: String, message: String },
}

/// Trait for anything that can answer a search query with articles.
///
/// Implemented by [`NewsApiClient`] for production; tests supply canned sources.
pub trait NewsSource {
    /// Run a single query with a search window starting at `query.from_date(today)`.
    async fn fetch(&self, query: &Query, today: NaiveDate) -> Result<Vec<Article>, FetchError>;
}

#[derive(Clone)]
struct ApiKey(String);

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Client for the NewsAPI `/v2/everything` endpoint.
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    http: Client,
    api_key: ApiKey,
    base_url: String,
    page_size: u32,
    domains: Vec<String>,
    timeout: Duration,
}

impl NewsApiClient {
    pub fn new(http: Client, api_key: &str, config: &DigestConfig) -> Self {
        Self {
            http,
            api_key: ApiKey(api_key.trim().to_string()),
            base_url: config.base_url.clone(),
            page_size: config.page_size,
            domains: config.domains.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    /// Build the request URL for one query, API key included.
    fn request_url(&self, query: &Query, today: NaiveDate) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.base_url)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", &query.q)
                .append_pair("language", query.language.code())
                .append_pair("from", &query.from_date(today).format("%Y-%m-%d").to_string())
                .append_pair("sortBy", "publishedAt")
                .append_pair("pageSize", &self.page_size.to_string());
            if !self.domains.is_empty() {
                pairs.append_pair("domains", &self.domains.join(","));
            }
            pairs.append_pair("apiKey", &self.api_key.0);
        }
        Ok(url)
    }
}

impl NewsSource for NewsApiClient {
    #[instrument(level = "info", skip_all, fields(q = %query.q, lookback_days = query.lookback_days))]
    async fn fetch(&self, query: &Query, today: NaiveDate) -> Result<Vec<Article>, FetchError> {
        let url = self.request_url(query, today)?;
        let t0 = Instant::now();

        let response = self
            .http
            .get(url)
            .header("User-Agent", USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if let Ok(body) = serde_json::from_str::<NewsApiResponse>(&text)
                && !body.is_ok()
            {
                return Err(api_error(body));
            }
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_for_log(&text, 200),
            });
        }

        let body: NewsApiResponse = response.json().await?;
        if !body.is_ok() {
            return Err(api_error(body));
        }

        debug!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            count = body.articles.len(),
            "Query returned articles"
        );
        Ok(body.articles)
    }
}

fn api_error(body: NewsApiResponse) -> FetchError {
    FetchError::Api {
        code: body.code.unwrap_or(body.status),
        message: body.message.unwrap_or_default(),
    }
}

/// Run every query in order and concatenate their articles.
///
/// Queries are awaited one at a time. A failed query is logged and skipped,
/// so the result preserves API order within a query and query order across
/// queries.
#[instrument(level = "info", skip_all, fields(queries = queries.len()))]
pub async fn fetch_all(source: &impl NewsSource, queries: &[Query], today: NaiveDate) -> Vec<Article> {
    let batches: Vec<Vec<Article>> = stream::iter(queries)
        .then(|query| async move {
            info!(q = %query.q, from = %query.from_date(today), "Searching articles");
            match source.fetch(query, today).await {
                Ok(articles) => {
                    info!(q = %query.q, count = articles.len(), "Fetched articles");
                    articles
                }
                Err(e) => {
                    warn!(q = %query.q, error = %e, "Query failed; skipping");
                    Vec::new()
                }
            }
        })
        .collect()
        .await;

    let articles: Vec<Article> = batches.into_iter().flatten().collect();
    info!(count = articles.len(), "Total articles fetched");
    articles
}
