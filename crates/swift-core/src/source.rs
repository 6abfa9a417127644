//! Blocklist sources

use std::sync::Arc;
use url::Url;

use crate::error::CoreError;
use crate::Result;

/// Immutable, ordered list of hostlist URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlocklistSource {
    uris: Arc<[Url]>,
}

impl BlocklistSource {
    pub fn empty() -> Self {
        Self {
            uris: Vec::new().into(),
        }
    }

    /// Build from already parsed URLs. Only `http` and `https` are accepted.
    pub fn new(uris: Vec<Url>) -> Result<Self> {
        if let Some(bad) = uris
            .iter()
            .find(|u| !matches!(u.scheme(), "http" | "https"))
        {
            return Err(CoreError::InvalidSource(format!(
                "unsupported scheme in {}",
                bad
            )));
        }

        Ok(Self { uris: uris.into() })
    }

    pub fn parse<I, S>(uris: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = uris
            .into_iter()
            .map(|raw| {
                let raw = raw.as_ref().trim();
                Url::parse(raw).map_err(|e| CoreError::InvalidSource(format!("{}: {}", raw, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(parsed)
    }

    pub fn uris(&self) -> &[Url] {
        &self.uris
    }

    pub fn iter(&self) -> impl Iterator<Item = &Url> {
        self.uris.iter()
    }

    pub fn len(&self) -> usize {
        self.uris.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }
}
