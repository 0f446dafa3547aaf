//! Article ingestion: scraped JSON batches to the search index.

use std::path::{Path, PathBuf};

use stockpulse_core::{NewsDocument, RawArticle};
use stockpulse_nlp::{parse_date, Translator};

use crate::error::IngestError;
use crate::sink::DocumentSink;

/// Prefix the scraper puts on cleaned batch files.
const CLEANED_PREFIX: &str = "cleaned_";

/// Outcome of one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Records read from the batch.
    pub loaded: usize,
    /// Records dropped for a missing title, missing date, or unparseable date.
    pub skipped: usize,
    /// As reported by the sink.
    pub succeeded: usize,
    pub failed: usize,
}

/// Outcome of a directory run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NewsIngestSummary {
    pub files: usize,
    /// Files that could not be read or parsed.
    pub files_failed: usize,
    pub loaded: usize,
    pub skipped: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl NewsIngestSummary {
    fn add(&mut self, batch: BatchSummary) {
        self.loaded += batch.loaded;
        self.skipped += batch.skipped;
        self.succeeded += batch.succeeded;
        self.failed += batch.failed;
    }
}

/// Company label for a batch file: the stem with any `cleaned_` prefix removed.
///
/// `data/news_data/cleaned_acme.json` → `acme`.
#[must_use]
pub fn company_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let stem = stem.split('.').next().unwrap_or(stem);
    let company = stem.strip_prefix(CLEANED_PREFIX).unwrap_or(stem);
    if company.is_empty() {
        None
    } else {
        Some(company.to_string())
    }
}

/// Reads a batch file: a JSON array of article objects.
///
/// # Errors
///
/// Returns [`IngestError::Io`] if the file cannot be read or
/// [`IngestError::Json`] if it is not an array of objects.
pub fn load_articles(path: &Path) -> Result<Vec<RawArticle>, IngestError> {
    let raw = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let articles: Vec<RawArticle> =
        serde_json::from_str(&raw).map_err(|source| IngestError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!(path = %path.display(), articles = articles.len(), "loaded articles");
    Ok(articles)
}

/// Normalizes `articles` into indexable documents for `company`.
///
/// Returns the documents and the number of records skipped. A record needs a
/// non-blank title and a `dd/mm/yyyy` publish date; title and content are
/// translated independently and an untranslated field is simply left out.
pub async fn build_documents<T: Translator + ?Sized>(
    translator: &T,
    articles: &[RawArticle],
    company: &str,
) -> (Vec<NewsDocument>, usize) {
    let mut documents = Vec::with_capacity(articles.len());
    let mut skipped = 0usize;

    for article in articles {
        let title = article.title.as_deref().map(str::trim).unwrap_or_default();
        let raw_date = article
            .publish_date
            .as_deref()
            .map(str::trim)
            .unwrap_or_default();
        if title.is_empty() || raw_date.is_empty() {
            tracing::warn!("skipping article missing title/publish_date");
            skipped += 1;
            continue;
        }

        let Some(publish_date) = parse_date(raw_date) else {
            tracing::warn!(publish_date = raw_date, "skipping article with invalid date");
            skipped += 1;
            continue;
        };

        let title_en = translator.translate(title).await;
        if title_en.is_none() {
            tracing::warn!(title = %preview(title), "title translation failed");
        }

        let content = article
            .content
            .as_deref()
            .filter(|c| !c.trim().is_empty());
        let content_en = match content {
            Some(text) => {
                let translated = translator.translate(text).await;
                if translated.is_none() {
                    tracing::warn!(title = %preview(title), "content translation failed");
                }
                translated
            }
            None => None,
        };

        documents.push(NewsDocument {
            title_vi: title.to_string(),
            title_en,
            content_vi: content.map(ToOwned::to_owned),
            content_en,
            publish_date,
            company: company.to_string(),
        });
    }

    (documents, skipped)
}

/// Normalizes one batch and submits it to `index` as a single bulk write.
///
/// Nothing is submitted when no record survives normalization.
pub async fn translate_and_index<T, S>(
    translator: &T,
    sink: &S,
    index: &str,
    articles: &[RawArticle],
    company: &str,
) -> BatchSummary
where
    T: Translator + ?Sized,
    S: DocumentSink + ?Sized,
{
    let (documents, skipped) = build_documents(translator, articles, company).await;
    let mut summary = BatchSummary {
        loaded: articles.len(),
        skipped,
        ..BatchSummary::default()
    };

    if documents.is_empty() {
        tracing::warn!(company, "no valid documents to index");
        return summary;
    }

    let result = sink.submit(index, &documents).await;
    summary.succeeded = result.succeeded;
    summary.failed = result.failed;
    tracing::info!(
        company,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "indexing complete"
    );
    summary
}

/// Runs every `*.json` batch in `dir`, in file-name order.
///
/// A batch that cannot be read is logged and counted in `files_failed`.
///
/// # Errors
///
/// Returns [`IngestError::MissingDirectory`] if `dir` is not a directory, or
/// [`IngestError::Io`] if it cannot be listed.
pub async fn ingest_news_dir<T, S>(
    translator: &T,
    sink: &S,
    index: &str,
    dir: &Path,
) -> Result<NewsIngestSummary, IngestError>
where
    T: Translator + ?Sized,
    S: DocumentSink + ?Sized,
{
    let files = list_files_with_extension(dir, "json")?;
    let mut summary = NewsIngestSummary::default();

    for path in files {
        summary.files += 1;
        let Some(company) = company_from_path(&path) else {
            tracing::warn!(path = %path.display(), "cannot derive company from file name");
            summary.files_failed += 1;
            continue;
        };

        let articles = match load_articles(&path) {
            Ok(articles) => articles,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to load articles");
                summary.files_failed += 1;
                continue;
            }
        };

        tracing::info!(company = %company, path = %path.display(), "processing articles");
        let batch = translate_and_index(translator, sink, index, &articles, &company).await;
        summary.add(batch);
        tracing::info!(company = %company, "finished processing articles");
    }

    Ok(summary)
}

/// Files in `dir` whose extension matches `ext` (case-insensitive), sorted.
pub(crate) fn list_files_with_extension(dir: &Path, ext: &str) -> Result<Vec<PathBuf>, IngestError> {
    if !dir.is_dir() {
        return Err(IngestError::MissingDirectory(dir.to_path_buf()));
    }
    let entries = std::fs::read_dir(dir).map_err(|source| IngestError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case(ext))
        })
        .collect();
    files.sort();
    Ok(files)
}

fn preview(text: &str) -> String {
    text.chars().take(50).collect()
}

#[cfg(test)]
#[path = "news_test.rs"]
mod tests;
