//! Blocklist pattern sets
//!
//! A `PatternSet` is built once per load cycle through a `PatternSetBuilder`
//! and never changes afterwards. Matching is literal substring containment,
//! answered by one Aho-Corasick pass over the URL regardless of how many
//! patterns there are or how their lengths are spread.

use aho_corasick::AhoCorasick;
use rustc_hash::FxHashSet;

use crate::parse::{candidate_lines, hosts_entries, LineFormat};

/// Immutable, deduplicated set of blocked patterns
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: FxHashSet<Box<str>>,
    /// Automaton over `patterns`; `None` only for an empty set or if the
    /// automaton could not be built
    matcher: Option<AhoCorasick>,
}

impl PatternSet {
    /// A set that blocks nothing
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> PatternSetBuilder {
        PatternSetBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.patterns.contains(pattern)
    }

    /// Iterate patterns in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| &**p)
    }

    /// Check if a URL contains any pattern
    pub fn is_blocked(&self, url: &str) -> bool {
        match &self.matcher {
            Some(matcher) => matcher.is_match(url),
            None => self.find_match(url).is_some(),
        }
    }

    /// Find a pattern occurring in `url`.
    ///
    /// Returns the slice of `url` equal to the first pattern the automaton
    /// reports, i.e. the one whose occurrence ends earliest.
    pub fn find_match<'u>(&self, url: &'u str) -> Option<&'u str> {
        match &self.matcher {
            Some(matcher) => matcher.find(url).map(|m| &url[m.range()]),
            None => self
                .patterns
                .iter()
                .find_map(|p| url.find(&**p).map(|start| &url[start..start + p.len()])),
        }
    }
}

impl PartialEq for PatternSet {
    fn eq(&self, other: &Self) -> bool {
        self.patterns == other.patterns
    }
}

impl Eq for PatternSet {}

impl<S: AsRef<str>> FromIterator<S> for PatternSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut builder = PatternSetBuilder::new();
        for pattern in iter {
            builder.insert(pattern.as_ref());
        }
        builder.finish()
    }
}

/// Accumulates patterns during a load cycle.
///
/// Owned by whoever is loading; only `finish` produces something a
/// classifier can see.
#[derive(Debug, Default)]
pub struct PatternSetBuilder {
    patterns: FxHashSet<Box<str>>,
}

impl PatternSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one pattern. Empty strings are ignored since they would match
    /// every URL. Returns true if the pattern was not already present.
    pub fn insert(&mut self, pattern: &str) -> bool {
        if pattern.is_empty() || self.patterns.contains(pattern) {
            return false;
        }
        self.patterns.insert(pattern.into())
    }

    /// Parse a downloaded list and add its patterns.
    ///
    /// Returns the number of entries read from `text`, duplicates included.
    pub fn extend_from_text(&mut self, text: &str, format: LineFormat) -> usize {
        let mut entries = 0;

        for line in candidate_lines(text) {
            match format {
                LineFormat::Plain => {
                    self.insert(line);
                    entries += 1;
                }
                LineFormat::Hosts => {
                    for host in hosts_entries(line) {
                        self.insert(host);
                        entries += 1;
                    }
                }
            }
        }

        entries
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn finish(self) -> PatternSet {
        if self.patterns.is_empty() {
            return PatternSet::empty();
        }

        let matcher = match AhoCorasick::new(self.patterns.iter().map(|p| p.as_bytes())) {
            Ok(matcher) => Some(matcher),
            Err(e) => {
                tracing::error!(
                    patterns = self.patterns.len(),
                    error = %e,
                    "Failed to build pattern automaton; falling back to linear scan"
                );
                None
            }
        };

        tracing::debug!(
            patterns = self.patterns.len(),
            automaton_bytes = matcher.as_ref().map_or(0, |m| m.memory_usage()),
            "Built pattern set"
        );

        PatternSet {
            patterns: self.patterns,
            matcher,
        }
    }
}
