//! Relevance filtering and deduplication over fetched articles.
//!
//! Both passes are single, in-memory sweeps that preserve input order.

use itertools::Itertools;
use tracing::{debug, info, instrument};

use crate::config::{DedupeKey, FilterConfig, RelevancePolicy};
use crate::models::Article;

/// Terms this short or shorter only match as whole words, so `ai` skips `aid` and `Dubai`.
pub const WHOLE_WORD_MAX_CHARS: usize = 3;

/// True iff `text` contains at least one AI term and at least one dental term.
///
/// Matching is a case-insensitive substring test, except that terms of at most
/// [`WHOLE_WORD_MAX_CHARS`] characters must stand as whole words. An empty
/// vocabulary matches nothing, so adding terms can only widen the set of
/// relevant texts.
pub fn is_relevant(
    title: Option<&str>,
    description: Option<&str>,
    ai_terms: &[String],
    dental_terms: &[String],
) -> bool {
    let text = format!(
        "{} {}",
        title.unwrap_or_default(),
        description.unwrap_or_default()
    )
    .to_lowercase();
    contains_any(&text, ai_terms) && contains_any(&text, dental_terms)
}

fn contains_any(haystack: &str, terms: &[String]) -> bool {
    terms.iter().any(|term| {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            false
        } else if term.chars().count() <= WHOLE_WORD_MAX_CHARS {
            contains_word(haystack, &term)
        } else {
            haystack.contains(&term)
        }
    })
}

/// True iff `word` occurs in `haystack` with no alphanumeric character on either side.
fn contains_word(haystack: &str, word: &str) -> bool {
    haystack.match_indices(word).any(|(idx, _)| {
        let before = haystack[..idx].chars().next_back();
        let after = haystack[idx + word.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

fn is_blank(field: Option<&str>) -> bool {
    field.is_none_or(|s| s.trim().is_empty())
}

/// Keep the articles the configured policy deems relevant.
#[instrument(level = "info", skip_all, fields(policy = ?config.policy, input = articles.len()))]
pub fn filter_relevant(articles: Vec<Article>, config: &FilterConfig) -> Vec<Article> {
    let kept: Vec<Article> = articles
        .into_iter()
        .filter(|a| {
            if config.require_title_and_description
                && (is_blank(a.title.as_deref()) || is_blank(a.description.as_deref()))
            {
                debug!(url = ?a.url, "Dropping article without title or description");
                return false;
            }
            match config.policy {
                RelevancePolicy::Off => true,
                RelevancePolicy::TitleOnly => is_relevant(
                    a.title.as_deref(),
                    None,
                    &config.ai_terms,
                    &config.dental_terms,
                ),
                RelevancePolicy::TitleAndDescription => is_relevant(
                    a.title.as_deref(),
                    a.description.as_deref(),
                    &config.ai_terms,
                    &config.dental_terms,
                ),
            }
        })
        .collect();
    info!(kept = kept.len(), "Relevance filter applied");
    kept
}

/// Identity of an article under `key`, or `None` when it has no usable key.
fn identity(article: &Article, key: DedupeKey) -> Option<String> {
    let raw = match key {
        DedupeKey::Url => article.url.as_deref(),
        DedupeKey::Title => article.title.as_deref(),
    }?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(match key {
        DedupeKey::Url => trimmed.to_string(),
        DedupeKey::Title => trimmed.to_lowercase(),
    })
}

/// Keep the first article per identity key, dropping those without one.
#[instrument(level = "info", skip_all, fields(key = ?key, input = articles.len()))]
pub fn dedupe(articles: Vec<Article>, key: DedupeKey) -> Vec<Article> {
    let unique: Vec<Article> = articles
        .into_iter()
        .filter_map(|a| identity(&a, key).map(|id| (id, a)))
        .unique_by(|(id, _)| id.clone())
        .map(|(_, a)| a)
        .collect();
    info!(unique = unique.len(), "Deduplicated articles");
    unique
}
