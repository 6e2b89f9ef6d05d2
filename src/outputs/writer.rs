//! Writes rendered digests to dated Markdown files.
//!
//! The file `<dir>/<YYYY-MM-DD>.md` is always replaced, never appended to,
//! so it reflects only the latest run for that date.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

use crate::models::Digest;
use crate::outputs::markdown::render_digest;

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Path of the digest file for `digest` inside `dir`.
pub fn digest_path(dir: &Path, digest: &Digest) -> PathBuf {
    dir.join(format!("{}.md", digest.date.format("%Y-%m-%d")))
}

/// Render `digest` and overwrite its dated file in `dir`, creating `dir` if needed.
#[instrument(level = "info", skip_all, fields(dir = %dir.display(), language = %digest.language, articles = digest.articles.len()))]
pub async fn write_digest(digest: &Digest, dir: &Path) -> Result<PathBuf, WriteError> {
    if let Err(source) = fs::create_dir_all(dir).await {
        error!(error = %source, "Failed to create output directory");
        return Err(WriteError::CreateDir {
            path: dir.to_path_buf(),
            source,
        });
    }

    let path = digest_path(dir, digest);
    let md = render_digest(digest);
    fs::write(&path, md).await.map_err(|source| WriteError::Write {
        path: path.clone(),
        source,
    })?;

    info!(path = %path.display(), "Wrote digest");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Language;
    use crate::models::Article;
    use chrono::NaiveDate;

    fn digest(articles: Vec<Article>) -> Digest {
        Digest {
            date: NaiveDate::from_ymd_opt(2025, 5, 6).unwrap(),
            language: Language::En,
            lookback_days: 7,
            articles,
        }
    }

    #[tokio::test]
    async fn test_write_creates_dir_and_dated_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("noticias").join("en");

        let path = write_digest(&digest(vec![]), &dir).await.unwrap();

        assert_eq!(path, dir.join("2025-05-06.md"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("No news found"));
    }

    #[tokio::test]
    async fn test_write_overwrites_previous_run() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("2025-05-06.md"), "stale content from an earlier run").unwrap();

        let article = Article {
            title: Some("AI dental".to_string()),
            url: Some("https://a".to_string()),
            ..Article::default()
        };
        let fresh = digest(vec![article]);
        let path = write_digest(&fresh, tmp.path()).await.unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(!content.contains("stale"));
        assert_eq!(content, render_digest(&fresh));
    }

    #[tokio::test]
    async fn test_write_fails_when_dir_is_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocked");
        std::fs::write(&blocker, "not a directory").unwrap();

        let result = write_digest(&digest(vec![]), &blocker).await;
        assert!(matches!(result, Err(WriteError::CreateDir { .. })));
    }
}
