//! OSV ecosystem catalog

use crate::{Error, Result};

/// Ecosystem names recognized by OSV.
const SUPPORTED: &[&str] = &[
    "AlmaLinux",
    "Alpaquita",
    "Alpine",
    "Android",
    "BellSoft Hardened Containers",
    "Bitnami",
    "Chainguard",
    "CRAN",
    "crates.io",
    "Debian",
    "Echo",
    "GHC",
    "GIT",
    "GitHub Actions",
    "Go",
    "Hackage",
    "Hex",
    "Linux",
    "Mageia",
    "Maven",
    "MinimOS",
    "npm",
    "NuGet",
    "openEuler",
    "openSUSE",
    "OSS-Fuzz",
    "Packagist",
    "Pub",
    "PyPI",
    "Red Hat",
    "Rocky Linux",
    "RubyGems",
    "SUSE",
    "SwiftURL",
    "Ubuntu",
    "Wolfi",
];

/// A validated OSV ecosystem name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ecosystem(String);

impl Ecosystem {
    /// Parse an ecosystem name, rejecting names OSV does not publish.
    pub fn parse(name: &str) -> Result<Self> {
        if SUPPORTED.contains(&name) {
            Ok(Self(name.to_string()))
        } else {
            Err(Error::InvalidEcosystem(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL of the OSV sitemap XML for this ecosystem.
    pub fn sitemap_url(&self) -> String {
        format!("https://osv.dev/sitemap_{}.xml", self.0.replace(' ', "_"))
    }
}

impl std::fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse a comma-separated list of ecosystem names.
///
/// Whitespace around names is trimmed and empty items are skipped; an
/// empty input yields an empty list.
pub fn parse_ecosystems(s: &str) -> Result<Vec<Ecosystem>> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(Vec::new());
    }

    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(Ecosystem::parse)
        .collect()
}
