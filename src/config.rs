//! Packager configuration loader.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::packaging::DEFAULT_MAX_CONCURRENT_FETCHES;

/// File name searched for by [`PackagerConfig::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "pwa-packager.config.json";

/// Discoverable configuration for validation and packaging runs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PackagerConfig {
    /// Path of the rewritten manifest inside the archive.
    pub manifest_entry_name: String,
    /// Name of the JSON listing of generated assets inside the asset directory.
    pub asset_listing_file: String,
    /// Upper bound on concurrent asset downloads.
    pub max_concurrent_fetches: usize,
    /// Where the archive is written when no explicit output is given.
    pub output_archive: String,
}

impl Default for PackagerConfig {
    fn default() -> Self {
        Self {
            manifest_entry_name: "manifest.json".into(),
            asset_listing_file: "assets.json".into(),
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            output_archive: "target/pwa-package.zip".into(),
        }
    }
}

impl PackagerConfig {
    /// Attempt to load configuration from the provided directory.
    ///
    /// A missing or unparsable file falls back to defaults.
    pub fn discover(dir: &Path) -> Self {
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        Self::from_path(&candidate).unwrap_or_default()
    }

    /// Read configuration from a specific JSON file.
    pub fn from_path(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Location of the asset listing within `asset_dir`.
    pub fn asset_listing_path(&self, asset_dir: &Path) -> PathBuf {
        asset_dir.join(&self.asset_listing_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn falls_back_to_defaults_without_file() {
        let dir = tempdir().unwrap();
        assert_eq!(PackagerConfig::discover(dir.path()), PackagerConfig::default());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            r#"{ "max_concurrent_fetches": 2, "manifest_entry_name": "app.webmanifest" }"#,
        )
        .unwrap();

        let config = PackagerConfig::discover(dir.path());
        assert_eq!(config.max_concurrent_fetches, 2);
        assert_eq!(config.manifest_entry_name, "app.webmanifest");
        assert_eq!(config.asset_listing_file, "assets.json");
        assert_eq!(config.output_archive, "target/pwa-package.zip");
    }

    #[test]
    fn malformed_file_is_ignored() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "{ not json").unwrap();
        assert_eq!(PackagerConfig::discover(dir.path()), PackagerConfig::default());
    }
}
