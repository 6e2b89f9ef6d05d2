//! The straight-line run: fetch → filter → dedupe → translate → render → write.
//!
//! Nothing is retried and nothing is carried between runs. A failure in one
//! stage is logged and narrows what reaches the next stage; it never aborts
//! the run.

use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::{error, info, instrument, warn};

use crate::api::{NewsSource, fetch_all};
use crate::config::{DigestConfig, Language, OutputTarget};
use crate::filters::{dedupe, filter_relevant};
use crate::models::{Article, Digest};
use crate::outputs::writer::write_digest;
use crate::translate::{Translator, translate_or_fallback};

/// Outcome of writing one digest.
#[derive(Debug)]
pub struct OutputReport {
    pub language: Language,
    pub dir: PathBuf,
    /// The file written, or the reason it could not be.
    pub result: Result<PathBuf, String>,
    /// Titles and descriptions that kept their original text after a failed translation.
    pub translation_fallbacks: usize,
}

/// Counts and per-output results from one run.
#[derive(Debug)]
pub struct RunSummary {
    pub date: NaiveDate,
    pub fetched: usize,
    pub relevant: usize,
    pub unique: usize,
    pub outputs: Vec<OutputReport>,
}

impl RunSummary {
    pub fn all_written(&self) -> bool {
        self.outputs.iter().all(|o| o.result.is_ok())
    }
}

/// Run the whole pipeline once for `today`.
#[instrument(level = "info", skip_all, fields(%today))]
pub async fn run(
    config: &DigestConfig,
    source: &impl NewsSource,
    translator: &impl Translator,
    today: NaiveDate,
) -> RunSummary {
    let fetched = fetch_all(source, &config.queries, today).await;
    let fetched_count = fetched.len();

    let relevant = filter_relevant(fetched, &config.filter);
    let relevant_count = relevant.len();

    let unique = dedupe(relevant, config.dedupe);
    info!(
        fetched = fetched_count,
        relevant = relevant_count,
        unique = unique.len(),
        "Articles ready for output"
    );

    let mut outputs = Vec::with_capacity(config.outputs.len());
    for target in &config.outputs {
        outputs.push(write_output(config, target, &unique, translator, today).await);
    }

    RunSummary {
        date: today,
        fetched: fetched_count,
        relevant: relevant_count,
        unique: unique.len(),
        outputs,
    }
}

#[instrument(level = "info", skip_all, fields(language = %target.language))]
async fn write_output(
    config: &DigestConfig,
    target: &OutputTarget,
    articles: &[Article],
    translator: &impl Translator,
    today: NaiveDate,
) -> OutputReport {
    let needs_translation = target.translate && target.language != config.source_language;
    let mut fallbacks = 0;

    let articles = if needs_translation {
        let mut translated = Vec::with_capacity(articles.len());
        for article in articles {
            let (article, failed) =
                translate_article(article, translator, config.source_language, target.language)
                    .await;
            fallbacks += failed;
            translated.push(article);
        }
        if fallbacks > 0 {
            warn!(fallbacks, "Some fields kept their original language");
        }
        translated
    } else {
        articles.to_vec()
    };

    let digest = Digest {
        date: today,
        language: target.language,
        lookback_days: config.lookback_days(),
        articles,
    };

    let dir = target.dir(&config.output_root);
    let result = match write_digest(&digest, &dir).await {
        Ok(path) => Ok(path),
        Err(e) => {
            error!(error = %e, "Failed to write digest");
            Err(e.to_string())
        }
    };

    OutputReport {
        language: target.language,
        dir,
        result,
        translation_fallbacks: fallbacks,
    }
}

/// Translate title and description, returning the copy and how many fields fell back.
async fn translate_article(
    article: &Article,
    translator: &impl Translator,
    source: Language,
    target: Language,
) -> (Article, usize) {
    let mut out = article.clone();
    let mut fallbacks = 0;

    for field in [&mut out.title, &mut out.description] {
        if let Some(text) = field.as_deref() {
            let translation = translate_or_fallback(translator, text, source, target).await;
            if translation.is_fallback() {
                fallbacks += 1;
            }
            *field = Some(translation.text().to_string());
        }
    }
    (out, fallbacks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FetchError;
    use crate::config::{Query, RelevancePolicy};
    use crate::models::ArticleSource;
    use crate::translate::TranslateError;
    use std::collections::HashMap;

    /// Returns a fixed article list per query text.
    struct CannedSource {
        by_query: HashMap<String, Result<Vec<Article>, u16>>,
    }

    impl NewsSource for CannedSource {
        async fn fetch(&self, query: &Query, _today: NaiveDate) -> Result<Vec<Article>, FetchError> {
            match self.by_query.get(&query.q) {
                Some(Ok(articles)) => Ok(articles.clone()),
                Some(Err(status)) => Err(FetchError::Status {
                    status: *status,
                    body: String::new(),
                }),
                None => Ok(Vec::new()),
            }
        }
    }

    struct PrefixTranslator;

    impl Translator for PrefixTranslator {
        async fn translate(&self, text: &str, _: Language, target: Language) -> Result<String, TranslateError> {
            Ok(format!("[{target}] {text}"))
        }
    }

    struct BrokenTranslator;

    impl Translator for BrokenTranslator {
        async fn translate(&self, _: &str, _: Language, _: Language) -> Result<String, TranslateError> {
            Err(TranslateError::Empty)
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 6).unwrap()
    }

    fn article(title: &str, description: &str, url: &str) -> Article {
        Article {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            url: Some(url.to_string()),
            source: Some(ArticleSource {
                name: Some("Example".to_string()),
            }),
            published_at: Some("2025-05-05T10:00:00Z".to_string()),
        }
    }

    fn config(root: &std::path::Path) -> DigestConfig {
        DigestConfig {
            queries: vec![
                Query::new("first", Language::En, 7),
                Query::new("second", Language::En, 7),
                Query::new("broken", Language::En, 7),
            ],
            output_root: root.to_path_buf(),
            ..DigestConfig::default()
        }
    }

    fn source() -> CannedSource {
        let mut by_query = HashMap::new();
        by_query.insert(
            "first".to_string(),
            Ok(vec![
                article("New AI tool detects cavities", "Dental imaging", "http://a"),
                article("Stock market update", "Nothing about teeth", "http://x"),
            ]),
        );
        by_query.insert(
            "second".to_string(),
            Ok(vec![
                article("AI tool detects cavities", "Dental imaging", "http://a"),
                article("Machine learning in orthodontics", "Aligners", "http://b"),
            ]),
        );
        by_query.insert("broken".to_string(), Err(500));
        CannedSource { by_query }
    }

    #[tokio::test]
    async fn run_filters_dedupes_and_writes_both_languages() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config(tmp.path());

        let summary = run(&config, &source(), &PrefixTranslator, today()).await;

        assert_eq!(summary.fetched, 4);
        assert_eq!(summary.relevant, 3);
        assert_eq!(summary.unique, 2);
        assert!(summary.all_written());

        let en = std::fs::read_to_string(tmp.path().join("en/2025-05-06.md")).unwrap();
        assert!(en.contains("Total: 2"));
        assert!(en.contains("## [New AI tool detects cavities](http://a)"));
        assert!(en.contains("## [Machine learning in orthodontics](http://b)"));
        assert!(!en.contains("Stock market"));
        assert!(en.find("http://a").unwrap() < en.find("http://b").unwrap());

        let es = std::fs::read_to_string(tmp.path().join("es/2025-05-06.md")).unwrap();
        assert!(es.contains("## [\\[es\\] New AI tool detects cavities](http://a)"));
        assert!(es.contains("[es] Dental imaging"));
        assert!(es.contains("- **Fuente:** Example"));
    }

    #[tokio::test]
    async fn run_with_failing_translator_keeps_original_text() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config(tmp.path());

        let summary = run(&config, &source(), &BrokenTranslator, today()).await;

        let es_report = summary
            .outputs
            .iter()
            .find(|o| o.language == Language::Es)
            .unwrap();
        assert_eq!(es_report.translation_fallbacks, 4);

        let es = std::fs::read_to_string(tmp.path().join("es/2025-05-06.md")).unwrap();
        assert!(es.contains("## [New AI tool detects cavities](http://a)"));
        assert!(es.contains("Dental imaging"));
    }

    #[tokio::test]
    async fn run_twice_same_day_leaves_single_run_content() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config(tmp.path());

        run(&config, &source(), &PrefixTranslator, today()).await;
        let first = std::fs::read_to_string(tmp.path().join("en/2025-05-06.md")).unwrap();
        run(&config, &source(), &PrefixTranslator, today()).await;
        let second = std::fs::read_to_string(tmp.path().join("en/2025-05-06.md")).unwrap();

        assert_eq!(first, second);
        assert_eq!(second.matches("\n## ").count(), 2);
    }

    #[tokio::test]
    async fn run_with_no_results_writes_sentinel() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config(tmp.path());
        let empty = CannedSource {
            by_query: HashMap::new(),
        };

        let summary = run(&config, &empty, &PrefixTranslator, today()).await;

        assert_eq!(summary.unique, 0);
        let en = std::fs::read_to_string(tmp.path().join("en/2025-05-06.md")).unwrap();
        assert!(en.contains("No news found in the last 7 days."));
        let es = std::fs::read_to_string(tmp.path().join("es/2025-05-06.md")).unwrap();
        assert!(es.contains("No se encontraron noticias"));
    }

    #[tokio::test]
    async fn run_reports_write_failure_and_continues() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("en"), "blocks the directory").unwrap();
        let config = config(tmp.path());

        let summary = run(&config, &source(), &PrefixTranslator, today()).await;

        assert!(!summary.all_written());
        let en = summary.outputs.iter().find(|o| o.language == Language::En).unwrap();
        assert!(en.result.is_err());
        let es = summary.outputs.iter().find(|o| o.language == Language::Es).unwrap();
        assert!(es.result.is_ok());
    }

    #[tokio::test]
    async fn run_with_legacy_policies() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = config(tmp.path());
        config.filter.policy = RelevancePolicy::Off;
        config.dedupe = crate::config::DedupeKey::Title;
        config.outputs = vec![OutputTarget {
            language: Language::Es,
            subdir: None,
            translate: false,
        }];

        let summary = run(&config, &source(), &PrefixTranslator, today()).await;

        assert_eq!(summary.relevant, 4);
        assert_eq!(summary.unique, 4);
        let es = std::fs::read_to_string(tmp.path().join("2025-05-06.md")).unwrap();
        assert!(es.contains("Stock market update"));
        assert!(!es.contains("[es]"));
    }
}
