//! Package build orchestrator: indexes the manifest, packages both image categories and
//! writes the rewritten manifest into the archive.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use tracing::info;

use crate::config::PackagerConfig;
use crate::models::{AssetListing, GeneratedAsset, ImageCategory, WebManifest};
use crate::packaging::{ArchiveWriter, AssetPackager, AssetSource, CategoryOutcome, PackagingError};
use crate::size_index::build_size_index;

/// Inputs for one package build.
#[derive(Debug, Clone, Default)]
pub struct PackageRequest {
  /// Manifest whose image entries will be rewritten.
  pub manifest: WebManifest,
  /// Generated icons.
  pub icons: Vec<GeneratedAsset>,
  /// Generated screenshots.
  pub screenshots: Vec<GeneratedAsset>,
}

impl PackageRequest {
  /// Pair a manifest with a listing of generated assets.
  pub fn from_listing(manifest: WebManifest, listing: AssetListing) -> Self {
    Self {
      manifest,
      icons: listing.icons,
      screenshots: listing.screenshots,
    }
  }

  fn assets(&self, category: ImageCategory) -> &[GeneratedAsset] {
    match category {
      ImageCategory::Icons => &self.icons,
      ImageCategory::Screenshots => &self.screenshots,
    }
  }
}

/// What happened to every asset, per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageSummary {
  /// Icon outcome.
  pub icons: CategoryOutcome,
  /// Screenshot outcome.
  pub screenshots: CategoryOutcome,
}

impl PackageSummary {
  fn outcome_mut(&mut self, category: ImageCategory) -> &mut CategoryOutcome {
    match category {
      ImageCategory::Icons => &mut self.icons,
      ImageCategory::Screenshots => &mut self.screenshots,
    }
  }
}

/// Finished package.
#[derive(Debug, Clone)]
pub struct PackageResult {
  /// Zip archive bytes.
  pub archive: Vec<u8>,
  /// Manifest with every packaged slot pointing into the archive.
  pub manifest: WebManifest,
  /// Per-asset outcome.
  pub summary: PackageSummary,
}

impl PackageResult {
  /// Write the archive to `path`, creating parent directories as needed.
  pub fn write_to(&self, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
      fs::create_dir_all(parent)
        .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, &self.archive).with_context(|| format!("failed to write {}", path.display()))
  }
}

/// High-level helper assembling a package from a manifest and generated assets.
pub struct PackageBuilder {
  packager: AssetPackager,
  manifest_entry_name: String,
}

impl PackageBuilder {
  /// Create a builder reading asset bytes from `source`.
  pub fn new(source: Arc<dyn AssetSource>, config: &PackagerConfig) -> Self {
    Self {
      packager: AssetPackager::new(source)
        .with_max_concurrent_fetches(config.max_concurrent_fetches),
      manifest_entry_name: config.manifest_entry_name.clone(),
    }
  }

  /// Build the package.
  ///
  /// Per-asset failures are recorded in the summary; only archive-level failures are returned
  /// as errors. The archive is dropped unfinished on any error path.
  pub async fn build(&self, mut request: PackageRequest) -> Result<PackageResult, PackagingError> {
    let mut archive = ArchiveWriter::new();
    let mut manifest = std::mem::take(&mut request.manifest);
    let mut summary = PackageSummary::default();

    for category in ImageCategory::ALL {
      let index = build_size_index(manifest.images(category));
      let outcome = self
        .packager
        .package_category(
          &mut archive,
          category,
          request.assets(category),
          &mut manifest,
          &index,
        )
        .await;

      info!(
        category = %category,
        packaged = outcome.packaged.len(),
        skipped = outcome.skipped.len(),
        "packaged category"
      );
      *summary.outcome_mut(category) = outcome;
    }

    let manifest_json = serde_json::to_vec_pretty(&manifest)?;
    archive.write_entry(&self.manifest_entry_name, &manifest_json)?;
    let archive = archive.finish()?;

    Ok(PackageResult {
      archive,
      manifest,
      summary,
    })
  }
}

impl std::fmt::Debug for PackageBuilder {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PackageBuilder")
      .field("packager", &self.packager)
      .field("manifest_entry_name", &self.manifest_entry_name)
      .finish()
  }
}
