use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::models::{AssetListing, WebManifest};

/// Load a manifest as raw JSON, the shape the validator works on.
pub fn load_manifest(path: &Path) -> Result<Value> {
  let content = fs::read_to_string(path)
    .with_context(|| format!("manifest not found at {}", path.display()))?;
  let manifest: Value =
    serde_json::from_str(&content).context("failed to parse web manifest JSON")?;
  Ok(manifest)
}

/// Load a manifest in the form used for packaging.
///
/// Only a document that is not a JSON object is rejected; mistyped members are carried along
/// untouched.
pub fn load_web_manifest(path: &Path) -> Result<WebManifest> {
  let value = load_manifest(path)?;
  WebManifest::from_value(value)
    .with_context(|| format!("{} is not a usable web manifest", path.display()))
}

/// Load the listing of generated assets that accompanies the stored images.
pub fn load_asset_listing(path: &Path) -> Result<AssetListing> {
  let content = fs::read_to_string(path)
    .with_context(|| format!("asset listing not found at {}", path.display()))?;
  serde_json::from_str(&content).context("failed to parse asset listing JSON")
}
