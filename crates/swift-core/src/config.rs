//! Filter configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use swift_privacy::LineFormat;

use crate::error::CoreError;
use crate::source::BlocklistSource;
use crate::Result;

/// Plain domain-per-line lists fetched when no sources are configured
const DEFAULT_SOURCES: &[&str] = &[
    "https://v.firebog.net/hosts/AdguardDNS.txt",
    "https://v.firebog.net/hosts/Easyprivacy.txt",
    "https://v.firebog.net/hosts/Prigent-Ads.txt",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hostlist URLs, fetched in this order
    pub sources: Vec<String>,
    /// Per-source request timeout
    pub timeout_secs: u64,
    /// Redirects followed per request
    pub max_redirects: usize,
    pub user_agent: String,
    /// Sources downloaded at the same time
    pub concurrent_fetches: usize,
    /// How list lines become patterns
    pub line_format: LineFormat,
    /// Enable request blocking
    pub enabled: bool,
}

impl Config {
    pub fn new(sources: Vec<String>) -> Self {
        Self {
            sources,
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(CoreError::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.concurrent_fetches == 0 {
            return Err(CoreError::Config(
                "concurrent_fetches must be greater than zero".to_string(),
            ));
        }
        self.blocklist_source()?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validated list of sources to load
    pub fn blocklist_source(&self) -> Result<BlocklistSource> {
        BlocklistSource::parse(&self.sources)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect(),
            timeout_secs: 20,
            max_redirects: 3,
            user_agent: "Mozilla/5.0 (SwiftBrowse)".to_string(),
            concurrent_fetches: 4,
            line_format: LineFormat::Plain,
            enabled: true,
        }
    }
}
