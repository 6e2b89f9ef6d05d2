//! Markdown rendering for a [`Digest`].
//!
//! # Layout
//!
//! ```text
//! # AI in Dentistry News (2025-05-06)
//!
//! Results from the last 7 days. Total: 2
//!
//! ## [Title](https://example.com/a)
//! - **Source:** Example
//! - **Published:** 2025-05-06 10:00:00 UTC
//!
//! Description paragraph.
//!
//! ---
//! ```
//!
//! An empty digest renders the heading followed by a fixed "no results" line.

use std::fmt::Write;

use crate::config::Language;
use crate::models::{Article, Digest};
use crate::utils::format_published;

/// Fixed strings for one output language.
#[derive(Debug, Clone, Copy)]
pub struct Labels {
    pub heading: &'static str,
    pub source: &'static str,
    pub published: &'static str,
    pub untitled: &'static str,
    pub unknown_source: &'static str,
    pub unknown_date: &'static str,
    summary: fn(u32, usize) -> String,
    no_results: fn(u32) -> String,
}

impl Labels {
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::En => Labels {
                heading: "AI in Dentistry News",
                source: "Source",
                published: "Published",
                untitled: "Untitled",
                unknown_source: "Unknown source",
                unknown_date: "Unknown date",
                summary: |days, total| format!("Results from the last {days} days. Total: {total}"),
                no_results: |days| format!("No news found in the last {days} days."),
            },
            Language::Es => Labels {
                heading: "Noticias sobre IA en Odontología",
                source: "Fuente",
                published: "Publicado",
                untitled: "Sin título",
                unknown_source: "Fuente desconocida",
                unknown_date: "Fecha desconocida",
                summary: |days, total| {
                    format!("Resultados de los últimos {days} días. Total: {total}")
                },
                no_results: |days| format!("No se encontraron noticias en los últimos {days} días."),
            },
        }
    }

    pub fn summary(&self, lookback_days: u32, total: usize) -> String {
        (self.summary)(lookback_days, total)
    }

    pub fn no_results(&self, lookback_days: u32) -> String {
        (self.no_results)(lookback_days)
    }
}

/// Placeholder link target for articles without a URL.
pub const MISSING_URL: &str = "#";

/// Escape the brackets that would end a Markdown link label early.
fn escape_link_label(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' | '\r' => out.push(' '),
            '[' | ']' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Render a digest to a complete Markdown document.
pub fn render_digest(digest: &Digest) -> String {
    let labels = Labels::for_language(digest.language);
    let mut md = String::new();

    writeln!(md, "# {} ({})\n", labels.heading, digest.date.format("%Y-%m-%d")).unwrap();

    if digest.articles.is_empty() {
        writeln!(md, "{}", labels.no_results(digest.lookback_days)).unwrap();
        return md;
    }

    writeln!(
        md,
        "{}\n",
        labels.summary(digest.lookback_days, digest.articles.len())
    )
    .unwrap();

    for article in &digest.articles {
        render_article(&mut md, article, &labels);
    }
    md
}

fn render_article(md: &mut String, article: &Article, labels: &Labels) {
    let title = article
        .title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(labels.untitled);
    let url = article
        .url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or(MISSING_URL);
    let source = article.source_name().unwrap_or(labels.unknown_source);
    let published = article
        .published_at
        .as_deref()
        .map(format_published)
        .unwrap_or_else(|| labels.unknown_date.to_string());

    writeln!(md, "## [{}]({})", escape_link_label(title), url.trim()).unwrap();
    writeln!(md, "- **{}:** {}", labels.source, source).unwrap();
    writeln!(md, "- **{}:** {}\n", labels.published, published).unwrap();

    if let Some(description) = article.description.as_deref().map(str::trim)
        && !description.is_empty()
    {
        writeln!(md, "{description}\n").unwrap();
    }

    writeln!(md, "---\n").unwrap();
}
