//! Data models for fetched articles and the digests built from them.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Article`]: A single article as returned by the news-search API
//! - [`NewsApiResponse`]: The JSON envelope wrapping a list of articles
//! - [`Digest`]: The ordered, filtered articles for one output language and date
//!
//! Every article field is optional because the upstream API makes no
//! promises about presence. Placeholders are substituted at render time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::Language;

/// The `status` value the API uses for a successful response.
pub const STATUS_OK: &str = "ok";

/// A raw article as returned by the news-search API.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Article {
    /// The headline.
    pub title: Option<String>,
    /// The teaser or summary supplied by the publisher.
    pub description: Option<String>,
    /// Canonical link to the article; the identity key for deduplication.
    pub url: Option<String>,
    /// The publishing outlet.
    pub source: Option<ArticleSource>,
    /// Publication timestamp, loosely ISO 8601. Never parsed.
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
}

impl Article {
    /// Name of the publishing outlet, if the API supplied one.
    pub fn source_name(&self) -> Option<&str> {
        self.source.as_ref().and_then(|s| s.name.as_deref())
    }
}

/// The `source` object nested in each article.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ArticleSource {
    pub name: Option<String>,
}

/// The JSON envelope returned by the `/v2/everything` endpoint.
///
/// Error responses share the envelope but carry `code` and `message`
/// instead of `articles`.
#[derive(Debug, Deserialize)]
pub struct NewsApiResponse {
    pub status: String,
    #[serde(default)]
    pub articles: Vec<Article>,
    pub code: Option<String>,
    pub message: Option<String>,
}

impl NewsApiResponse {
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// The articles that survive filtering, ready to render for one language.
///
/// Each run produces one `Digest` per configured output. It is rendered
/// to Markdown and fully replaces any earlier file for the same date.
#[derive(Debug, Clone)]
pub struct Digest {
    /// The generation date; also the output file stem.
    pub date: NaiveDate,
    /// Language the digest is rendered in.
    pub language: Language,
    /// The widest lookback window across the run's queries, for the summary line.
    pub lookback_days: u32,
    /// Articles in API order, query order breaking ties.
    pub articles: Vec<Article>,
}
