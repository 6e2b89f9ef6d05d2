//! Best-effort machine translation of article titles and descriptions.
//!
//! Translation never fails the run. [`translate_or_fallback`] wraps any
//! [`Translator`] and turns every error or empty result into
//! [`Translation::Fallback`], carrying the original text through unchanged.

use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::api::USER_AGENT;
use crate::config::Language;
use crate::utils::{truncate_chars, truncate_for_log};

/// Longest input, in characters, submitted to the translation endpoint.
pub const MAX_TRANSLATE_CHARS: usize = 490;

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("unexpected response shape: {0}")]
    Malformed(String),

    #[error("empty translation")]
    Empty,
}

/// Abstraction over a translation backend.
/// Implemented by [`GoogleTranslator`] for production; tests supply their own.
pub trait Translator {
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, TranslateError>;
}

/// What happened to one piece of text on its way into a digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// No translation was needed.
    Original(String),
    Translated(String),
    /// Translation was attempted and failed; the original text is kept.
    Fallback { original: String, reason: String },
}

impl Translation {
    /// The text to render.
    pub fn text(&self) -> &str {
        match self {
            Translation::Original(text) | Translation::Translated(text) => text,
            Translation::Fallback { original, .. } => original,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Translation::Fallback { .. })
    }
}

/// Translate `text`, falling back to the original on any failure.
///
/// Input beyond [`MAX_TRANSLATE_CHARS`] is cut before submission. Fallbacks
/// return the full, untruncated original.
#[instrument(level = "debug", skip_all, fields(%source, %target, chars = text.chars().count()))]
pub async fn translate_or_fallback(
    translator: &impl Translator,
    text: &str,
    source: Language,
    target: Language,
) -> Translation {
    if source == target || text.trim().is_empty() {
        return Translation::Original(text.to_string());
    }

    let submitted = truncate_chars(text, MAX_TRANSLATE_CHARS);
    let outcome = match translator.translate(submitted, source, target).await {
        Ok(translated) if !translated.trim().is_empty() => return Translation::Translated(translated),
        Ok(_) => TranslateError::Empty,
        Err(e) => e,
    };

    warn!(
        error = %outcome,
        text = %truncate_for_log(text, 80),
        "Translation failed; keeping original text"
    );
    Translation::Fallback {
        original: text.to_string(),
        reason: outcome.to_string(),
    }
}

/// Client for the public Google Translate `translate_a/single` endpoint.
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl GoogleTranslator {
    pub fn new(http: Client, base_url: &str, timeout: Duration) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
            timeout,
        }
    }
}

impl Translator for GoogleTranslator {
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, TranslateError> {
        let url = format!(
            "{}?client=gtx&sl={}&tl={}&dt=t&q={}",
            self.base_url,
            source.code(),
            target.code(),
            urlencoding::encode(text)
        );

        let response = self
            .http
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslateError::Status(status.as_u16()));
        }

        let body: serde_json::Value = response.json().await?;
        let translated = join_segments(&body)?;
        debug!(chars = translated.chars().count(), "Translated text");
        Ok(translated)
    }
}

/// Concatenate the translated segments of a `translate_a/single` response.
///
/// The response is a nested array whose first element lists
/// `[translated, original, ...]` segments.
fn join_segments(body: &serde_json::Value) -> Result<String, TranslateError> {
    let segments = body
        .get(0)
        .and_then(|s| s.as_array())
        .ok_or_else(|| TranslateError::Malformed(truncate_for_log(&body.to_string(), 120)))?;

    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(|t| t.as_str()))
        .collect();
    if text.trim().is_empty() {
        return Err(TranslateError::Empty);
    }
    Ok(text)
}
