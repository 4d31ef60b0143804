//! JDK toolchain catalogs.
//!
//! Two fixed catalogs exist. Images whose base JDK predates Java 8 get the
//! legacy set; everything else gets the modern set. Each entry maps the
//! version a build asks for to the JDK installation that provides it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::errors::EnvError;

/// Default directory holding JDK installations.
pub const DEFAULT_JVM_ROOT: &str = "/usr/lib/jvm";

/// Base Java version assumed when none is configured.
pub const DEFAULT_BASE_JAVA_VERSION: &str = "17";

/// (requested version, installed release id)
const LEGACY_CATALOG: &[(&str, &str)] = &[("7", "1.7.0"), ("8", "1.8.0"), ("11", "11")];

const MODERN_CATALOG: &[(&str, &str)] = &[
    ("8", "1.8.0"),
    ("9", "11"),
    ("11", "11"),
    ("17", "17"),
    ("21", "21"),
    ("22", "22"),
];

/// A JDK version and the installation that provides it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolchainEntry {
    pub version: String,
    pub jdk_home: PathBuf,
}

/// An ordered, duplicate-free list of toolchain entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ToolchainSet {
    entries: Vec<ToolchainEntry>,
}

impl ToolchainSet {
    /// Entries in catalog order.
    pub fn entries(&self) -> &[ToolchainEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Versions in catalog order.
    pub fn versions(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.version.as_str()).collect()
    }

    /// Look up the JDK home for a version.
    pub fn jdk_home(&self, version: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|e| e.version == version)
            .map(|e| e.jdk_home.as_path())
    }
}

/// Resolves catalog entries to JDK installations on this machine.
#[derive(Debug, Clone)]
pub struct ToolchainCatalog {
    jvm_root: PathBuf,
    /// Per-version home overrides from configuration
    homes: BTreeMap<String, PathBuf>,
}

impl ToolchainCatalog {
    /// Create a catalog rooted at the given JVM directory.
    pub fn new(jvm_root: impl Into<PathBuf>) -> Self {
        ToolchainCatalog {
            jvm_root: jvm_root.into(),
            homes: BTreeMap::new(),
        }
    }

    /// Override the JDK home used for specific versions.
    pub fn with_homes(mut self, homes: BTreeMap<String, PathBuf>) -> Self {
        self.homes.extend(homes);
        self
    }

    /// Select the legacy or modern set.
    pub fn select(&self, legacy: bool) -> ToolchainSet {
        let catalog = if legacy { LEGACY_CATALOG } else { MODERN_CATALOG };

        let entries = catalog
            .iter()
            .map(|(version, release)| ToolchainEntry {
                version: (*version).to_string(),
                jdk_home: self
                    .homes
                    .get(*version)
                    .cloned()
                    .unwrap_or_else(|| self.jvm_root.join(format!("java-{}-openjdk", release))),
            })
            .collect();

        ToolchainSet { entries }
    }
}

impl Default for ToolchainCatalog {
    fn default() -> Self {
        ToolchainCatalog::new(DEFAULT_JVM_ROOT)
    }
}

/// Parse a base Java version marker into its major version.
///
/// Accepts `17`, `1.8`, `1.7.0`, `1.8.0_292` and `21.0.2`.
pub fn parse_major_version(marker: &str) -> Result<u32, EnvError> {
    let trimmed = marker.trim();
    let rest = trimmed.strip_prefix("1.").unwrap_or(trimmed);
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();

    digits
        .parse::<u32>()
        .map_err(|_| EnvError::InvalidBaseVersion(marker.to_string()))
}

/// Whether the base version selects the legacy catalog.
pub fn is_legacy_base(marker: &str) -> Result<bool, EnvError> {
    Ok(parse_major_version(marker)? < 8)
}
