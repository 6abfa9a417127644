//! Hostlist line parsing

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Loopback and bookkeeping names that hosts files map but never mean to block
const IGNORED_HOSTS: &[&str] = &[
    "localhost",
    "localhost.localdomain",
    "local",
    "broadcasthost",
    "ip6-localhost",
    "ip6-loopback",
    "ip6-localnet",
    "ip6-mcastprefix",
    "ip6-allnodes",
    "ip6-allrouters",
    "ip6-allhosts",
    "0.0.0.0",
];

/// How each line of a downloaded list turns into patterns.
///
/// Both formats trim surrounding whitespace and skip blank lines and lines
/// starting with `#`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineFormat {
    /// The whole line is one pattern, taken verbatim.
    #[default]
    Plain,
    /// `/etc/hosts` syntax: `<address> <host> [host...]` with trailing
    /// comments. Only the host columns become patterns.
    Hosts,
}

impl LineFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineFormat::Plain => "plain",
            LineFormat::Hosts => "hosts",
        }
    }
}

impl std::str::FromStr for LineFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" => Ok(LineFormat::Plain),
            "hosts" => Ok(LineFormat::Hosts),
            _ => Err(format!("Unknown line format: {}", s)),
        }
    }
}

/// Lines worth looking at: trimmed, non-empty, not a comment
pub(crate) fn candidate_lines(text: &str) -> impl Iterator<Item = &str> + '_ {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

/// Host columns of a single hosts-file line
pub(crate) fn hosts_entries(line: &str) -> impl Iterator<Item = &str> + '_ {
    let body = line.split_once('#').map_or(line, |(head, _)| head);
    let mut fields = body.split_whitespace().peekable();

    // Leading address column, if any
    if fields
        .peek()
        .is_some_and(|field| field.parse::<IpAddr>().is_ok())
    {
        fields.next();
    }

    fields.filter(|host| !IGNORED_HOSTS.contains(host))
}
