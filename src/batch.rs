//! Multi-document batch processing.
//!
//! Documents are processed concurrently on a dedicated thread pool, one
//! document per task. Each document is handled by an independent
//! [`Unexam`] pipeline, so no state is shared between documents.
//!
//! # Example
//!
//! ```no_run
//! use unexam::batch::{BatchOptions, BatchProcessor, DocumentSource, JsonDocumentFile};
//!
//! fn main() -> unexam::Result<()> {
//!     let sources: Vec<Box<dyn DocumentSource>> = vec![
//!         Box::new(JsonDocumentFile::new("paper1.json")),
//!         Box::new(JsonDocumentFile::new("paper2.json")),
//!     ];
//!
//!     let report = BatchProcessor::new(BatchOptions::default())?.run(&sources);
//!     println!("{:?}: {} ok", report.status, report.succeeded());
//!     Ok(())
//! }
//! ```

use crate::error::{Error, Result};
use crate::model::{MediaContext, RelationshipKind, StyledRun};
use crate::{DocumentResult, Unexam};
use chrono::{DateTime, Utc};
use crossbeam_channel::Sender;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Number of documents processed at the same time by default.
pub const DEFAULT_WORKERS: usize = 3;

/// One document's inputs, held in memory.
#[derive(Debug, Clone, Default)]
pub struct DocumentInput {
    /// Display name
    pub name: String,

    /// Styled runs in any order; `original_order` carries the sequence
    pub runs: Vec<StyledRun>,

    /// Main document markup (may be empty)
    pub body_markup: String,

    /// Relationships and media for images
    pub media: MediaContext,
}

impl DocumentInput {
    /// Create an input with runs only.
    pub fn new(name: impl Into<String>, runs: Vec<StyledRun>) -> Self {
        Self {
            name: name.into(),
            runs,
            ..Default::default()
        }
    }

    /// Set the body markup.
    pub fn with_body(mut self, body_markup: impl Into<String>) -> Self {
        self.body_markup = body_markup.into();
        self
    }

    /// Set the media context.
    pub fn with_media(mut self, media: MediaContext) -> Self {
        self.media = media;
        self
    }
}

/// Something that can produce a [`DocumentInput`].
pub trait DocumentSource: Send + Sync {
    /// Display name used in reports and events.
    fn name(&self) -> String;

    /// Load the document's inputs.
    fn load(&self) -> Result<DocumentInput>;
}

impl DocumentSource for DocumentInput {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn load(&self) -> Result<DocumentInput> {
        Ok(self.clone())
    }
}

/// On-disk JSON shape read by [`JsonDocumentFile`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentFile {
    /// Styled runs; `null` or absent is a missing input
    #[serde(default)]
    pub runs: Option<Vec<StyledRun>>,

    /// Main document markup
    #[serde(default)]
    pub body_markup: String,

    /// Relationships part markup
    #[serde(default)]
    pub relationships_markup: String,

    /// Directory holding the unpacked package, relative to the JSON file
    #[serde(default)]
    pub media_dir: Option<PathBuf>,
}

/// A document stored as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonDocumentFile {
    path: PathBuf,
}

impl JsonDocumentFile {
    /// Create a source for a JSON file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn media_root(&self, dir: &Path) -> PathBuf {
        match self.path.parent() {
            Some(parent) if dir.is_relative() => parent.join(dir),
            _ => dir.to_path_buf(),
        }
    }
}

/// Read the bytes of every image relationship target found under `root`.
///
/// `root` is the unpacked package directory, so a target such as
/// `word/media/image1.png` is read from `root/word/media/image1.png`.
/// Missing files are skipped. Returns the number of parts loaded.
pub fn load_media_dir(media: &mut MediaContext, root: &Path) -> Result<usize> {
    let targets: Vec<String> = media
        .relationships()
        .filter(|r| r.kind == RelationshipKind::Image)
        .map(|r| r.target.clone())
        .collect();
    let mut loaded = 0;
    for target in targets {
        let file = root.join(&target);
        if file.is_file() {
            media.add_media(target, std::fs::read(&file)?);
            loaded += 1;
        } else {
            log::debug!("Media {} not found under {}", target, root.display());
        }
    }
    Ok(loaded)
}

impl DocumentSource for JsonDocumentFile {
    fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    fn load(&self) -> Result<DocumentInput> {
        let content = std::fs::read_to_string(&self.path)?;
        let file: DocumentFile = serde_json::from_str(&content)?;

        let runs = file
            .runs
            .ok_or_else(|| Error::MissingInput(format!("runs in {}", self.path.display())))?;

        let mut media = MediaContext::from_relationships_xml(&file.relationships_markup);
        if let Some(dir) = &file.media_dir {
            load_media_dir(&mut media, &self.media_root(dir))?;
        }

        Ok(DocumentInput {
            name: self.name(),
            runs,
            body_markup: file.body_markup,
            media,
        })
    }
}

/// Cooperative cancellation flag shared with a running batch.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; documents not yet started are skipped.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Progress notification sent while a batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    /// A document started processing
    Started {
        /// Position of the document in the batch
        index: usize,
        /// Document name
        name: String,
    },
    /// A document finished, failed or was cancelled
    Finished {
        /// Position of the document in the batch
        index: usize,
        /// Document name
        name: String,
        /// Final state of the document
        status: DocumentStatus,
    },
}

/// Final state of one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Processed successfully
    Completed,
    /// Loading or processing failed
    Error,
    /// Skipped because the batch was cancelled
    Cancelled,
}

/// Overall state of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    /// Every document completed (or the batch was empty)
    Completed,
    /// Some documents completed, some failed
    Partial,
    /// Cancellation was requested during the run
    Cancelled,
    /// Every document failed
    Failed,
}

/// Outcome of one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    /// Position of the document in the batch
    pub index: usize,

    /// Document name
    pub name: String,

    /// Final state
    pub status: DocumentStatus,

    /// Extraction result when completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<DocumentResult>,

    /// Error message when failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Processing time in milliseconds
    pub elapsed_ms: u64,
}

impl DocumentReport {
    fn cancelled(index: usize, name: String) -> Self {
        Self {
            index,
            name,
            status: DocumentStatus::Cancelled,
            result: None,
            error: None,
            elapsed_ms: 0,
        }
    }
}

/// Outcome of a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Overall state
    pub status: BatchStatus,

    /// Per-document outcomes in input order
    pub documents: Vec<DocumentReport>,

    /// When the batch started
    pub started_at: DateTime<Utc>,

    /// When the batch finished
    pub completed_at: DateTime<Utc>,
}

impl BatchReport {
    /// Number of completed documents.
    pub fn succeeded(&self) -> usize {
        self.count(DocumentStatus::Completed)
    }

    /// Number of failed documents.
    pub fn failed(&self) -> usize {
        self.count(DocumentStatus::Error)
    }

    /// Number of documents skipped by cancellation.
    pub fn cancelled(&self) -> usize {
        self.count(DocumentStatus::Cancelled)
    }

    /// Indices of failed documents, for retrying.
    pub fn failed_indices(&self) -> Vec<usize> {
        self.documents
            .iter()
            .filter(|d| d.status == DocumentStatus::Error)
            .map(|d| d.index)
            .collect()
    }

    fn count(&self, status: DocumentStatus) -> usize {
        self.documents.iter().filter(|d| d.status == status).count()
    }

    fn summarize(documents: &[DocumentReport], cancelled: bool) -> BatchStatus {
        let completed = documents
            .iter()
            .filter(|d| d.status == DocumentStatus::Completed)
            .count();
        let failed = documents
            .iter()
            .filter(|d| d.status == DocumentStatus::Error)
            .count();

        if cancelled {
            BatchStatus::Cancelled
        } else if failed == 0 {
            BatchStatus::Completed
        } else if completed > 0 {
            BatchStatus::Partial
        } else {
            BatchStatus::Failed
        }
    }
}

/// Options for batch processing.
#[derive(Clone)]
pub struct BatchOptions {
    /// Number of documents processed at the same time
    pub workers: usize,

    /// Pipeline applied to every document
    pub pipeline: Unexam,

    /// Cancellation token
    pub cancel: CancelToken,

    /// Progress event sink
    pub events: Option<Sender<BatchEvent>>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            pipeline: Unexam::default(),
            cancel: CancelToken::new(),
            events: None,
        }
    }
}

impl std::fmt::Debug for BatchOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOptions")
            .field("workers", &self.workers)
            .field("cancelled", &self.cancel.is_cancelled())
            .field("events", &self.events.is_some())
            .finish()
    }
}

impl BatchOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of concurrent documents (at least 1).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the pipeline.
    pub fn with_pipeline(mut self, pipeline: Unexam) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Set the cancellation token.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Send progress events to a channel.
    pub fn with_events(mut self, events: Sender<BatchEvent>) -> Self {
        self.events = Some(events);
        self
    }
}

/// Runs documents through the pipeline on a bounded thread pool.
pub struct BatchProcessor {
    options: BatchOptions,
    pool: rayon::ThreadPool,
}

impl BatchProcessor {
    /// Create a processor with its own thread pool.
    pub fn new(options: BatchOptions) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.workers.max(1))
            .thread_name(|i| format!("unexam-batch-{}", i))
            .build()
            .map_err(|e| Error::Other(format!("Failed to build thread pool: {}", e)))?;
        Ok(Self { options, pool })
    }

    /// Cancellation token of this processor.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.options.cancel
    }

    /// Process every source; per-document failures never abort the batch.
    pub fn run<S: AsRef<dyn DocumentSource> + Sync>(&self, sources: &[S]) -> BatchReport {
        let started_at = Utc::now();
        log::debug!(
            "Batch started: {} documents, {} workers",
            sources.len(),
            self.options.workers
        );

        let documents: Vec<DocumentReport> = self.pool.install(|| {
            sources
                .par_iter()
                .enumerate()
                .map(|(index, source)| self.process_one(index, source.as_ref()))
                .collect()
        });

        let cancelled = self.options.cancel.is_cancelled();
        let report = BatchReport {
            status: BatchReport::summarize(&documents, cancelled),
            documents,
            started_at,
            completed_at: Utc::now(),
        };
        log::debug!(
            "Batch finished: {:?} ({} ok, {} failed, {} cancelled)",
            report.status,
            report.succeeded(),
            report.failed(),
            report.cancelled()
        );
        report
    }

    /// Process the failed documents of an earlier report again.
    ///
    /// Returns the earlier report with the retried entries replaced and
    /// the status recomputed.
    pub fn retry_failed<S: AsRef<dyn DocumentSource> + Sync>(
        &self,
        sources: &[S],
        report: BatchReport,
    ) -> BatchReport {
        let mut report = report;
        let retry = report.failed_indices();
        log::debug!("Retrying {} failed documents", retry.len());

        let retried: Vec<DocumentReport> = self.pool.install(|| {
            retry
                .par_iter()
                .filter_map(|&index| {
                    sources
                        .get(index)
                        .map(|source| self.process_one(index, source.as_ref()))
                })
                .collect()
        });

        for doc in retried {
            if let Some(slot) = report.documents.get_mut(doc.index) {
                *slot = doc;
            }
        }

        report.status =
            BatchReport::summarize(&report.documents, self.options.cancel.is_cancelled());
        report.completed_at = Utc::now();
        report
    }

    fn process_one(&self, index: usize, source: &dyn DocumentSource) -> DocumentReport {
        let name = source.name();
        if self.options.cancel.is_cancelled() {
            self.emit(BatchEvent::Finished {
                index,
                name: name.clone(),
                status: DocumentStatus::Cancelled,
            });
            return DocumentReport::cancelled(index, name);
        }

        self.emit(BatchEvent::Started {
            index,
            name: name.clone(),
        });

        let start = Instant::now();
        let outcome = source
            .load()
            .map(|input| self.options.pipeline.process(&input));
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let report = match outcome {
            Ok(result) => DocumentReport {
                index,
                name,
                status: DocumentStatus::Completed,
                result: Some(result),
                error: None,
                elapsed_ms,
            },
            Err(e) => {
                log::warn!("Document {} failed: {}", name, e);
                DocumentReport {
                    index,
                    name,
                    status: DocumentStatus::Error,
                    result: None,
                    error: Some(e.to_string()),
                    elapsed_ms,
                }
            }
        };

        self.emit(BatchEvent::Finished {
            index,
            name: report.name.clone(),
            status: report.status,
        });
        report
    }

    fn emit(&self, event: BatchEvent) {
        if let Some(events) = &self.options.events {
            // A dropped receiver only means nobody is listening.
            let _ = events.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl DocumentSource for Failing {
        fn name(&self) -> String {
            "broken".to_string()
        }

        fn load(&self) -> Result<DocumentInput> {
            Err(Error::MissingInput("runs".to_string()))
        }
    }

    fn good(name: &str) -> Box<dyn DocumentSource> {
        Box::new(DocumentInput::new(name, vec![StyledRun::new("一、选择题", 14.0, true, 0)]))
    }

    #[test]
    fn test_status_summary() {
        let processor = BatchProcessor::new(BatchOptions::default()).unwrap();

        let all_ok = processor.run(&[good("a"), good("b")]);
        assert_eq!(all_ok.status, BatchStatus::Completed);
        assert_eq!(all_ok.succeeded(), 2);

        let mixed = processor.run(&[good("a"), Box::new(Failing) as Box<dyn DocumentSource>]);
        assert_eq!(mixed.status, BatchStatus::Partial);
        assert_eq!(mixed.failed_indices(), vec![1]);

        let none_ok = processor.run(&[Box::new(Failing) as Box<dyn DocumentSource>]);
        assert_eq!(none_ok.status, BatchStatus::Failed);
    }

    #[test]
    fn test_empty_batch_completes() {
        let processor = BatchProcessor::new(BatchOptions::default()).unwrap();
        let report = processor.run::<Box<dyn DocumentSource>>(&[]);
        assert_eq!(report.status, BatchStatus::Completed);
        assert!(report.documents.is_empty());
    }

    #[test]
    fn test_cancelled_before_start() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let processor =
            BatchProcessor::new(BatchOptions::new().with_cancel_token(cancel)).unwrap();

        let report = processor.run(&[good("a"), good("b")]);
        assert_eq!(report.status, BatchStatus::Cancelled);
        assert_eq!(report.cancelled(), 2);
    }

    #[test]
    fn test_events() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let processor = BatchProcessor::new(BatchOptions::new().with_events(tx)).unwrap();
        processor.run(&[good("a")]);

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], BatchEvent::Started { index: 0, .. }));
        assert!(matches!(
            events[1],
            BatchEvent::Finished {
                status: DocumentStatus::Completed,
                ..
            }
        ));
    }

    #[test]
    fn test_workers_at_least_one() {
        assert_eq!(BatchOptions::new().with_workers(0).workers, 1);
        assert_eq!(BatchOptions::default().workers, DEFAULT_WORKERS);
    }
}
