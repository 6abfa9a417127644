//! SwiftBrowse Privacy Protection
//!
//! Request blocking driven by plain-text hostlists:
//! - Hostlists are merged into one deduplicated `PatternSet`
//! - A request URL is blocked when any pattern occurs in it verbatim
//! - Pattern sets are immutable once built and safe to share across threads
//!
//! This crate has no I/O. Fetching the lists and publishing snapshots is the
//! job of `swift-core`.

mod classifier;
mod parse;
mod patterns;

pub use classifier::{classify, ClassificationResult};
pub use parse::LineFormat;
pub use patterns::{PatternSet, PatternSetBuilder};
