//! Blocklist loader
//!
//! Fetches every configured source, skipping the ones that fail, and merges
//! whatever arrived into a single pattern set.

use chrono::{DateTime, Utc};
use futures_util::{stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use swift_privacy::{LineFormat, PatternSet, PatternSetBuilder};

use crate::fetcher::ListFetcher;
use crate::source::BlocklistSource;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SourceStatus {
    /// Source fetched; `entries` lines (or hosts) were read from it
    Loaded { entries: usize },
    /// Source skipped for this cycle
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReport {
    pub uri: String,
    pub status: SourceStatus,
}

impl SourceReport {
    pub fn is_loaded(&self) -> bool {
        matches!(self.status, SourceStatus::Loaded { .. })
    }
}

/// Summary of one load cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadReport {
    /// Cycle number, increasing with every load started
    pub generation: u64,
    /// One entry per source, in configured order
    pub sources: Vec<SourceReport>,
    pub unique_patterns: usize,
    /// False when a newer cycle had already published its set
    pub published: bool,
    pub completed_at: DateTime<Utc>,
}

impl LoadReport {
    pub fn loaded_sources(&self) -> usize {
        self.sources.iter().filter(|s| s.is_loaded()).count()
    }

    pub fn failed_sources(&self) -> usize {
        self.sources.len() - self.loaded_sources()
    }
}

/// Merged result of fetching every source once
#[derive(Debug)]
pub struct LoadOutcome {
    pub patterns: PatternSet,
    pub sources: Vec<SourceReport>,
}

pub struct BlocklistLoader {
    fetcher: Arc<dyn ListFetcher>,
    line_format: LineFormat,
    /// Maximum sources in flight
    concurrency: usize,
}

impl BlocklistLoader {
    pub fn new(fetcher: Arc<dyn ListFetcher>, line_format: LineFormat, concurrency: usize) -> Self {
        Self {
            fetcher,
            line_format,
            concurrency: concurrency.max(1),
        }
    }

    /// Fetch all sources and merge them.
    ///
    /// Never fails: a source that cannot be fetched is logged, reported as
    /// `SourceStatus::Failed` and left out of the set.
    pub async fn load(&self, sources: &BlocklistSource) -> LoadOutcome {
        let fetches: Vec<_> = sources
            .iter()
            .cloned()
            .enumerate()
            .map(|(idx, uri)| {
                let fetcher = Arc::clone(&self.fetcher);
                async move {
                    let result = fetcher.fetch(&uri).await;
                    (idx, uri, result)
                }
            })
            .collect();
        let mut fetches = stream::iter(fetches).buffer_unordered(self.concurrency);

        let mut builder = PatternSetBuilder::new();
        let mut reports: Vec<(usize, SourceReport)> = Vec::with_capacity(sources.len());

        while let Some((idx, uri, result)) = fetches.next().await {
            let status = match result {
                Ok(body) => {
                    let entries = builder.extend_from_text(&body, self.line_format);
                    tracing::info!(
                        source = %uri,
                        entries,
                        merged = builder.len(),
                        "Loaded blocklist source"
                    );
                    SourceStatus::Loaded { entries }
                }
                Err(e) => {
                    tracing::warn!(source = %uri, error = %e, "Skipping blocklist source");
                    SourceStatus::Failed {
                        reason: e.to_string(),
                    }
                }
            };

            reports.push((
                idx,
                SourceReport {
                    uri: uri.to_string(),
                    status,
                },
            ));
        }

        reports.sort_by_key(|(idx, _)| *idx);
        let reports: Vec<SourceReport> = reports.into_iter().map(|(_, r)| r).collect();

        if !reports.is_empty() && !reports.iter().any(SourceReport::is_loaded) {
            tracing::warn!(
                sources = reports.len(),
                "No blocklist source could be loaded; requests will not be blocked"
            );
        }

        LoadOutcome {
            patterns: builder.finish(),
            sources: reports,
        }
    }
}
