use std::sync::Arc;
use std::time::Instant;

use futures::{stream, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use linkrank_core::config::LoaderConfig;
use linkrank_core::PageId;
use linkrank_graph::{GraphStore, PageLinks};
use linkrank_storage::{CorpusSource, StorageError};

use crate::links::LinkExtractor;

/// Counters describing one load.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadSummary {
    pub entries_listed: usize,
    /// Listed entries that are not documents (wrong extension, directory markers).
    pub entries_skipped: usize,
    pub documents_loaded: usize,
    pub documents_failed: usize,
    /// Documents whose PageId had already been loaded from another entry.
    pub documents_replaced: usize,
    pub elapsed_secs: f64,
}

pub struct LoadOutcome {
    pub graph: GraphStore,
    pub summary: LoadSummary,
}

/// Builds a [`GraphStore`] from every document at a [`CorpusSource`].
///
/// Up to `workers` documents are fetched and parsed concurrently. Parsed
/// results flow back, in listing order, to the single consumer loop in
/// [`CorpusLoader::load`], which is the only writer of the graph. When two
/// entries reduce to the same PageId the one listed last wins, however the
/// fetches interleave.
pub struct CorpusLoader {
    source: Arc<dyn CorpusSource>,
    extractor: Arc<LinkExtractor>,
    workers: usize,
    progress_interval: usize,
}

impl CorpusLoader {
    pub fn new(source: Arc<dyn CorpusSource>, extractor: LinkExtractor) -> Self {
        let defaults = LoaderConfig::default();
        Self {
            source,
            extractor: Arc::new(extractor),
            workers: defaults.workers,
            progress_interval: defaults.progress_interval,
        }
    }

    pub fn with_config(self, config: &LoaderConfig) -> Self {
        self.with_workers(config.workers)
            .with_progress_interval(config.progress_interval)
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Log progress every `interval` processed documents; 0 disables it.
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Enumerate, fetch, parse and merge every document.
    ///
    /// Only a source that cannot be listed is an error; individual documents
    /// that fail are logged, counted and left out of the graph.
    pub async fn load(&self) -> Result<LoadOutcome, StorageError> {
        let start = Instant::now();
        info!("Loading graph from {}", self.source.describe());

        let entries = self.source.list_entries().await?;
        let documents: Vec<String> = entries
            .iter()
            .filter(|name| self.extractor.is_document(name))
            .cloned()
            .collect();
        let mut summary = LoadSummary {
            entries_listed: entries.len(),
            entries_skipped: entries.len() - documents.len(),
            ..LoadSummary::default()
        };
        info!(
            "Found {} documents to process ({} other entries skipped)",
            documents.len(),
            summary.entries_skipped
        );

        let mut graph = GraphStore::new();
        let mut results = stream::iter(documents)
            .map(|name| {
                let source = Arc::clone(&self.source);
                let extractor = Arc::clone(&self.extractor);
                tokio::spawn(async move {
                    let parsed = fetch_and_parse(source.as_ref(), &extractor, &name).await;
                    (name, parsed)
                })
            })
            .buffered(self.workers);

        let mut processed = 0usize;
        while let Some(joined) = results.next().await {
            processed += 1;
            match joined {
                Ok((name, Ok(links))) => {
                    debug!(entry = %name, links = links.targets.len(), "parsed document");
                    if graph.merge(links) {
                        summary.documents_replaced += 1;
                    }
                    summary.documents_loaded += 1;
                }
                Ok((name, Err(e))) => {
                    warn!(entry = %name, error = %e, "skipping document");
                    summary.documents_failed += 1;
                }
                Err(e) => {
                    warn!(error = %e, "document task failed");
                    summary.documents_failed += 1;
                }
            }

            if self.progress_interval > 0 && processed % self.progress_interval == 0 {
                info!(
                    "Processed {} files ({:.1}s)",
                    processed,
                    start.elapsed().as_secs_f64()
                );
            }
        }

        graph.finalize();
        summary.elapsed_secs = start.elapsed().as_secs_f64();
        info!(
            "Graph built: {} pages in {:.2} seconds ({} loaded, {} failed)",
            graph.page_count(),
            summary.elapsed_secs,
            summary.documents_loaded,
            summary.documents_failed
        );

        Ok(LoadOutcome { graph, summary })
    }
}

async fn fetch_and_parse(
    source: &dyn CorpusSource,
    extractor: &LinkExtractor,
    name: &str,
) -> Result<PageLinks, StorageError> {
    let page = PageId::from_entry_name(name)
        .ok_or_else(|| StorageError::InvalidEntry(name.to_string()))?;
    let raw = source.fetch_content(name).await?;
    Ok(PageLinks {
        page,
        targets: extractor.extract(&raw),
    })
}
