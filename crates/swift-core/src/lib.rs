//! SwiftBrowse Core
//!
//! Ad and tracker blocking for the browser shell:
//! - Hostlists are downloaded in the background and merged into one set
//! - The merged set is published as an immutable snapshot
//! - The engine's request hook asks `FilterService::is_blocked` before
//!   every navigation or subresource load

mod config;
mod error;
mod fetcher;
mod loader;
mod service;
mod source;

pub use config::Config;
pub use error::{CoreError, FetchError};
pub use fetcher::{HttpFetcher, ListFetcher};
pub use loader::{BlocklistLoader, LoadOutcome, LoadReport, SourceReport, SourceStatus};
pub use service::{FilterService, NavigationFilter};
pub use source::BlocklistSource;

// Re-export the matching layer
pub use swift_privacy::{classify, ClassificationResult, LineFormat, PatternSet, PatternSetBuilder};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
