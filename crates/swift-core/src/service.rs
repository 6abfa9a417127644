//! Process-wide request filter
//!
//! One `FilterService` is created at startup and cloned into every place
//! the browser engine asks whether a request may proceed. Loading runs on
//! the tokio runtime; classification only ever reads the last published
//! snapshot.

use arc_swap::ArcSwap;
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use swift_privacy::{classify, ClassificationResult, PatternSet};

use crate::config::Config;
use crate::fetcher::{HttpFetcher, ListFetcher};
use crate::loader::{BlocklistLoader, LoadReport};
use crate::source::BlocklistSource;
use crate::Result;

/// Synchronous predicate the engine integration calls before dispatching a
/// request.
pub trait NavigationFilter: Send + Sync {
    fn should_block(&self, url: &str) -> bool;
}

/// Bookkeeping for the published pattern set. Only loaders touch it.
struct Published {
    generation: u64,
    report: Option<LoadReport>,
}

pub struct FilterService {
    config: Arc<Config>,
    loader: Arc<BlocklistLoader>,
    /// Runtime that background loads are spawned on
    runtime: Handle,
    /// Published pattern set; readers load it without locking
    patterns: Arc<ArcSwap<PatternSet>>,
    /// Serializes publishers
    published: Arc<RwLock<Published>>,
    /// Last generation handed out to a load cycle
    generation: Arc<AtomicU64>,
    enabled: Arc<AtomicBool>,
}

impl FilterService {
    /// Create a service fetching lists over HTTP
    pub fn new(config: Config, runtime: Handle) -> Result<Self> {
        config.validate()?;
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher), runtime))
    }

    pub fn with_fetcher(config: Config, fetcher: Arc<dyn ListFetcher>, runtime: Handle) -> Self {
        let loader = BlocklistLoader::new(fetcher, config.line_format, config.concurrent_fetches);
        let enabled = config.enabled;

        Self {
            config: Arc::new(config),
            loader: Arc::new(loader),
            runtime,
            patterns: Arc::new(ArcSwap::from_pointee(PatternSet::empty())),
            published: Arc::new(RwLock::new(Published {
                generation: 0,
                report: None,
            })),
            generation: Arc::new(AtomicU64::new(0)),
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // === Loading ===

    /// Load `sources` in the background.
    ///
    /// Returns immediately. The handle resolves to the cycle's report and
    /// may be dropped.
    pub fn start_load(&self, sources: BlocklistSource) -> JoinHandle<LoadReport> {
        let service = self.clone();
        self.runtime
            .spawn(async move { service.load_now(&sources).await })
    }

    /// Reload the configured sources in the background
    pub fn refresh(&self) -> Result<JoinHandle<LoadReport>> {
        let sources = self.config.blocklist_source()?;
        Ok(self.start_load(sources))
    }

    /// Run one load cycle to completion and publish its result
    pub async fn load_now(&self, sources: &BlocklistSource) -> LoadReport {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(generation, sources = sources.len(), "Loading blocklists");

        let outcome = self.loader.load(sources).await;

        let mut report = LoadReport {
            generation,
            sources: outcome.sources,
            unique_patterns: outcome.patterns.len(),
            published: false,
            completed_at: Utc::now(),
        };
        report.published = self.publish(outcome.patterns, &report);

        if report.published {
            tracing::info!(
                generation,
                patterns = report.unique_patterns,
                loaded = report.loaded_sources(),
                failed = report.failed_sources(),
                "Published blocklist snapshot"
            );
        } else {
            tracing::info!(generation, "Discarded blocklist load superseded by a newer one");
        }

        report
    }

    /// Swap in a new pattern set unless a newer cycle got there first
    fn publish(&self, patterns: PatternSet, report: &LoadReport) -> bool {
        let next = Arc::new(patterns);

        let mut published = self.published.write();
        if report.generation < published.generation {
            return false;
        }
        let previous = self.patterns.swap(next);
        published.generation = report.generation;
        published.report = Some(LoadReport {
            published: true,
            ..report.clone()
        });
        drop(published);

        // Free the old set outside the lock; readers may still hold it
        drop(previous);
        true
    }

    // === Classification ===

    /// Latest published pattern set, possibly empty
    pub fn current_patterns(&self) -> Arc<PatternSet> {
        self.patterns.load_full()
    }

    /// Generation of the published snapshot, 0 before the first load
    pub fn current_generation(&self) -> u64 {
        self.published.read().generation
    }

    pub fn last_report(&self) -> Option<LoadReport> {
        self.published.read().report.clone()
    }

    pub fn classify(&self, url: &str) -> ClassificationResult {
        if !self.is_enabled() {
            return ClassificationResult::allowed();
        }

        let patterns = self.patterns.load();
        let result = classify(url, &patterns);
        if let Some(pattern) = result.matched.as_deref() {
            tracing::debug!(url, pattern, "Blocked request");
        }
        result
    }

    pub fn is_blocked(&self, url: &str) -> bool {
        self.classify(url).blocked
    }

    // === Toggle ===

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
        tracing::info!(enabled, "Request blocking toggled");
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}

impl NavigationFilter for FilterService {
    fn should_block(&self, url: &str) -> bool {
        self.is_blocked(url)
    }
}

impl Clone for FilterService {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            loader: Arc::clone(&self.loader),
            runtime: self.runtime.clone(),
            patterns: Arc::clone(&self.patterns),
            published: Arc::clone(&self.published),
            generation: Arc::clone(&self.generation),
            enabled: Arc::clone(&self.enabled),
        }
    }
}
