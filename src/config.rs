//! Run configuration: search queries, filter vocabularies, and output targets.
//!
//! Everything a run needs is carried in a [`DigestConfig`] value that is
//! passed into [`crate::pipeline::run`]. The defaults reproduce the current
//! policy: URL deduplication, the dual-vocabulary filter, and a 7-day lookback
//! split into English and Spanish digests. Older policies stay available as
//! configuration options.
//!
//! # YAML
//!
//! ```yaml
//! output_root: noticias
//! page_size: 20
//! domains: [dental-tribune.com, dentistrytoday.com]
//! dedupe: title
//! filter:
//!   policy: title_only
//! queries:
//!   - q: '"AI in dentistry"'
//!     language: en
//!     lookback_days: 2
//! outputs:
//!   - language: es
//!     translate: true
//! ```

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2/everything";
pub const DEFAULT_TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";
pub const MAX_LOOKBACK_DAYS: u32 = 365;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("invalid base URL {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    Invalid(&'static str),
}

/// Languages a digest can be rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Es,
}

impl Language {
    /// ISO 639-1 tag as used by the search and translation APIs.
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One search issued against the news API.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Query {
    /// Boolean/keyword search expression, passed through untouched.
    pub q: String,
    /// Language tag for the API's `language` parameter.
    #[serde(default = "default_query_language")]
    pub language: Language,
    /// How many days before today the search window starts.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
}

impl Query {
    pub fn new(q: &str, language: Language, lookback_days: u32) -> Self {
        Self {
            q: q.to_string(),
            language,
            lookback_days,
        }
    }

    /// First day of the search window, clamped to the earliest representable date.
    pub fn from_date(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_days(Days::new(u64::from(self.lookback_days)))
            .unwrap_or(NaiveDate::MIN)
    }
}

fn default_query_language() -> Language {
    Language::En
}

fn default_lookback_days() -> u32 {
    7
}

/// Which text the relevance filter inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelevancePolicy {
    /// Match both vocabularies against title and description together.
    #[default]
    TitleAndDescription,
    /// Match both vocabularies against the title alone.
    TitleOnly,
    /// Keep every article.
    Off,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    pub policy: RelevancePolicy,
    /// Drop articles missing a title or a description before matching.
    pub require_title_and_description: bool,
    pub ai_terms: Vec<String>,
    pub dental_terms: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            policy: RelevancePolicy::default(),
            require_title_and_description: false,
            ai_terms: to_strings(&[
                "artificial intelligence",
                "inteligencia artificial",
                "machine learning",
                "deep learning",
                "neural network",
                "computer vision",
                "generative ai",
                "chatgpt",
                "llm",
                "ai-powered",
                "ai-driven",
                "ai-based",
                "ai",
                "a.i.",
            ]),
            dental_terms: to_strings(&[
                "dental",
                "dentist",
                "odontolog",
                "orthodont",
                "periodont",
                "endodont",
                "prosthodont",
                "oral health",
                "oral care",
                "oral surgery",
                "cavities",
                "caries",
            ]),
        }
    }
}

/// Identity used to collapse duplicate articles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupeKey {
    #[default]
    Url,
    /// Lower-cased title. Collision-prone; kept for older digests.
    Title,
}

/// One Markdown digest written per run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OutputTarget {
    pub language: Language,
    /// Directory below `output_root`; `None` writes straight into the root.
    #[serde(default)]
    pub subdir: Option<String>,
    /// Translate titles and descriptions when `language` differs from the source.
    #[serde(default)]
    pub translate: bool,
}

impl OutputTarget {
    pub fn dir(&self, output_root: &Path) -> PathBuf {
        match &self.subdir {
            Some(subdir) => output_root.join(subdir),
            None => output_root.to_path_buf(),
        }
    }
}

/// Everything one run of the pipeline needs, apart from the API key.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DigestConfig {
    pub base_url: String,
    pub translate_url: String,
    pub queries: Vec<Query>,
    pub page_size: u32,
    /// Optional allow-list sent as the `domains` parameter.
    pub domains: Vec<String>,
    pub request_timeout_secs: u64,
    pub filter: FilterConfig,
    pub dedupe: DedupeKey,
    /// Language the fetched articles are written in.
    pub source_language: Language,
    pub output_root: PathBuf,
    pub outputs: Vec<OutputTarget>,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            translate_url: DEFAULT_TRANSLATE_URL.to_string(),
            queries: vec![
                Query::new(
                    r#""AI in dentistry" OR (("Artificial Intelligence" OR AI) AND (dentistry OR dental))"#,
                    Language::En,
                    7,
                ),
                Query::new(
                    r#"("machine learning" OR "deep learning") AND (dental OR dentist OR orthodontics)"#,
                    Language::En,
                    7,
                ),
            ],
            page_size: 50,
            domains: Vec::new(),
            request_timeout_secs: 15,
            filter: FilterConfig::default(),
            dedupe: DedupeKey::default(),
            source_language: Language::En,
            output_root: PathBuf::from("noticias"),
            outputs: vec![
                OutputTarget {
                    language: Language::En,
                    subdir: Some("en".to_string()),
                    translate: false,
                },
                OutputTarget {
                    language: Language::Es,
                    subdir: Some("es".to_string()),
                    translate: true,
                },
            ],
        }
    }
}

impl DigestConfig {
    /// Load a config from a YAML file, or fall back to the defaults.
    ///
    /// Keys missing from the file keep their default values.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let shown = path.display().to_string();
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: shown.clone(),
                    source,
                })?;
                let config: DigestConfig =
                    serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
                        path: shown.clone(),
                        source,
                    })?;
                info!(path = %shown, "Loaded configuration");
                config
            }
            None => {
                info!("No config file given; using built-in defaults");
                DigestConfig::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for raw in [&self.base_url, &self.translate_url] {
            Url::parse(raw).map_err(|_| ConfigError::InvalidUrl(raw.clone()))?;
        }
        if self.queries.is_empty() {
            return Err(ConfigError::Invalid("at least one query is required"));
        }
        if self.outputs.is_empty() {
            return Err(ConfigError::Invalid("at least one output is required"));
        }
        if self.queries.iter().any(|q| q.lookback_days > MAX_LOOKBACK_DAYS) {
            return Err(ConfigError::Invalid("lookback_days must be at most 365"));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be positive"));
        }
        Ok(())
    }

    /// The widest lookback window across all queries.
    pub fn lookback_days(&self) -> u32 {
        self.queries
            .iter()
            .map(|q| q.lookback_days)
            .max()
            .unwrap_or_else(default_lookback_days)
    }
}

fn to_strings(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|t| t.to_string()).collect()
}
