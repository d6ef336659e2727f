//! Matching generated assets onto manifest slots and writing them into the archive.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::archive::ArchiveWriter;
use super::error::AssetFailure;
use super::source::AssetSource;
use crate::asset_paths::{is_unsafe_asset_name, make_archive_path};
use crate::models::{GeneratedAsset, ImageCategory, WebManifest};
use crate::size_index::SizeIndex;

/// Default number of asset downloads allowed in flight at once.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;

/// Asset written into the archive with its manifest slot rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackagedAsset {
  /// Storage name of the asset.
  pub name: String,
  /// Path of the entry inside the archive.
  pub path: String,
  /// Position of the rewritten manifest entry.
  pub slot: usize,
}

/// Asset left out of the package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedAsset {
  /// Storage name of the asset.
  pub name: String,
  /// Why the asset was skipped.
  #[serde(flatten)]
  pub failure: AssetFailure,
}

/// Per-category record of what the packager did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryOutcome {
  /// Assets packaged, in input order.
  pub packaged: Vec<PackagedAsset>,
  /// Assets skipped, in the order they failed.
  pub skipped: Vec<SkippedAsset>,
}

impl CategoryOutcome {
  fn skip(&mut self, category: ImageCategory, name: &str, failure: AssetFailure) {
    warn!(
      asset = %name,
      category = %category,
      error = %failure,
      "failed to add image to archive"
    );
    self.skipped.push(SkippedAsset {
      name: name.to_string(),
      failure,
    });
  }
}

struct PlannedAsset {
  name: String,
  path: String,
  slot: usize,
}

/// Writes generated images into an archive and points the manifest at them.
///
/// Holds no state between calls; every [`AssetPackager::package_category`] run is a single
/// best-effort pass without rollback.
#[derive(Clone)]
pub struct AssetPackager {
  source: Arc<dyn AssetSource>,
  max_concurrent_fetches: usize,
}

impl AssetPackager {
  /// Create a packager downloading bytes from `source`.
  pub fn new(source: Arc<dyn AssetSource>) -> Self {
    Self {
      source,
      max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
    }
  }

  /// Limit the number of concurrent downloads. Zero is treated as one.
  pub fn with_max_concurrent_fetches(mut self, limit: usize) -> Self {
    self.max_concurrent_fetches = limit.max(1);
    self
  }

  /// Package every asset of one category.
  ///
  /// Each asset is matched on its effective size, fetched, written to `{category}/{name}` and
  /// its manifest slot's `src` rewritten to that path. Failures are logged and recorded in the
  /// returned outcome; they never abort the remaining assets. Writes follow the order of
  /// `assets`, so when two assets resolve to the same slot the later one wins.
  pub async fn package_category(
    &self,
    archive: &mut ArchiveWriter,
    category: ImageCategory,
    assets: &[GeneratedAsset],
    manifest: &mut WebManifest,
    index: &SizeIndex,
  ) -> CategoryOutcome {
    let mut outcome = CategoryOutcome::default();
    let mut planned = Vec::with_capacity(assets.len());

    for asset in assets {
      match plan_asset(category, asset, manifest, index) {
        Ok(plan) => planned.push(plan),
        Err(failure) => outcome.skip(category, &asset.name, failure),
      }
    }

    let fetched = self.fetch_all(&planned).await;

    for (plan, result) in planned.into_iter().zip(fetched) {
      let bytes = match result {
        Ok(bytes) => bytes,
        Err(failure) => {
          outcome.skip(category, &plan.name, failure);
          continue;
        }
      };

      let Some(entry) = manifest.image_mut(category, plan.slot) else {
        outcome.skip(category, &plan.name, AssetFailure::SlotOutOfRange { slot: plan.slot });
        continue;
      };

      if let Err(err) = archive.write_entry(&plan.path, &bytes) {
        let failure = AssetFailure::Write {
          message: err.to_string(),
        };
        outcome.skip(category, &plan.name, failure);
        continue;
      }
      entry.src = Some(plan.path.clone());

      debug!(asset = %plan.name, path = %plan.path, slot = plan.slot, "packaged image");
      outcome.packaged.push(PackagedAsset {
        name: plan.name,
        path: plan.path,
        slot: plan.slot,
      });
    }

    outcome
  }

  async fn fetch_all(&self, planned: &[PlannedAsset]) -> Vec<Result<Vec<u8>, AssetFailure>> {
    let limiter = Arc::new(Semaphore::new(self.max_concurrent_fetches));
    let mut tasks = JoinSet::new();

    for (position, plan) in planned.iter().enumerate() {
      let source = Arc::clone(&self.source);
      let limiter = Arc::clone(&limiter);
      let name = plan.name.clone();
      tasks.spawn(async move { (position, fetch_with_permit(source, limiter, name).await) });
    }

    let mut results: Vec<Option<Result<Vec<u8>, AssetFailure>>> =
      planned.iter().map(|_| None).collect();

    while let Some(joined) = tasks.join_next().await {
      match joined {
        Ok((position, result)) => {
          let result = result.map_err(|err| AssetFailure::Fetch {
            message: format!("{err:#}"),
          });
          if let Some(slot) = results.get_mut(position) {
            *slot = Some(result);
          }
        }
        Err(err) => warn!(error = %err, "asset fetch task aborted"),
      }
    }

    results
      .into_iter()
      .map(|result| {
        result.unwrap_or_else(|| {
          Err(AssetFailure::Fetch {
            message: "fetch task did not complete".to_string(),
          })
        })
      })
      .collect()
  }
}

impl std::fmt::Debug for AssetPackager {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AssetPackager")
      .field("max_concurrent_fetches", &self.max_concurrent_fetches)
      .finish_non_exhaustive()
  }
}

fn plan_asset(
  category: ImageCategory,
  asset: &GeneratedAsset,
  manifest: &WebManifest,
  index: &SizeIndex,
) -> Result<PlannedAsset, AssetFailure> {
  if is_unsafe_asset_name(&asset.name) {
    return Err(AssetFailure::UnsafeName);
  }

  let metadata = asset
    .metadata
    .as_ref()
    .ok_or(AssetFailure::MissingMetadata)?;

  if metadata.is_mismatched() {
    debug!(
      asset = %asset.name,
      requested = %metadata.requested_size,
      actual = %metadata.actual_size,
      "generated size differs from requested size, matching on actual size"
    );
  }

  let size = metadata.effective_size();
  let slot = index
    .lookup(size)
    .ok_or_else(|| AssetFailure::NoMatchingSlot {
      size: size.to_string(),
    })?;

  if slot >= manifest.images(category).len() {
    return Err(AssetFailure::SlotOutOfRange { slot });
  }

  Ok(PlannedAsset {
    name: asset.name.clone(),
    path: make_archive_path(category, &asset.name),
    slot,
  })
}

async fn fetch_with_permit(
  source: Arc<dyn AssetSource>,
  limiter: Arc<Semaphore>,
  name: String,
) -> anyhow::Result<Vec<u8>> {
  let _permit = limiter.acquire_owned().await?;
  source.fetch(&name).await
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::{BTreeMap, BTreeSet};
  use std::io::{Cursor, Read};

  use anyhow::anyhow;
  use async_trait::async_trait;
  use zip::ZipArchive;

  use crate::models::{AssetMetadata, ImageResource};
  use crate::size_index::build_size_index;

  #[derive(Default)]
  struct MemorySource {
    files: BTreeMap<String, Vec<u8>>,
    failing: BTreeSet<String>,
  }

  impl MemorySource {
    fn with_file(mut self, name: &str, bytes: &[u8]) -> Self {
      self.files.insert(name.to_string(), bytes.to_vec());
      self
    }

    fn with_failure(mut self, name: &str) -> Self {
      self.failing.insert(name.to_string());
      self
    }
  }

  #[async_trait]
  impl AssetSource for MemorySource {
    async fn fetch(&self, name: &str) -> anyhow::Result<Vec<u8>> {
      if self.failing.contains(name) {
        return Err(anyhow!("storage unavailable for {name}"));
      }
      self
        .files
        .get(name)
        .cloned()
        .ok_or_else(|| anyhow!("no blob named {name}"))
    }
  }

  fn manifest(icon_sizes: &[&str]) -> WebManifest {
    WebManifest {
      icons: Some(
        icon_sizes
          .iter()
          .enumerate()
          .map(|(position, sizes)| ImageResource::new(format!("original-{position}.png"), *sizes))
          .collect(),
      ),
      ..WebManifest::default()
    }
  }

  fn asset(name: &str, requested: &str, actual: &str) -> GeneratedAsset {
    GeneratedAsset::new(name, AssetMetadata::new(requested, actual))
  }

  fn icon_src(manifest: &WebManifest, slot: usize) -> &str {
    manifest.images(ImageCategory::Icons)[slot]
      .src
      .as_deref()
      .unwrap_or_default()
  }

  fn read_entry(bytes: Vec<u8>, path: &str) -> Option<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).ok()?;
    let mut file = archive.by_name(path).ok()?;
    let mut content = Vec::new();
    file.read_to_end(&mut content).ok()?;
    Some(content)
  }

  async fn package(
    source: MemorySource,
    manifest: &mut WebManifest,
    assets: &[GeneratedAsset],
  ) -> (CategoryOutcome, Vec<u8>) {
    let packager = AssetPackager::new(Arc::new(source)).with_max_concurrent_fetches(2);
    let index = build_size_index(manifest.images(ImageCategory::Icons));
    let mut archive = ArchiveWriter::new();
    let outcome = packager
      .package_category(&mut archive, ImageCategory::Icons, assets, manifest, &index)
      .await;
    (outcome, archive.finish().unwrap())
  }

  #[tokio::test]
  async fn rewrites_matching_slot_and_writes_entry() {
    let mut manifest = manifest(&["192x192", "512x512"]);
    let source = MemorySource::default().with_file("icon-512.png", b"512");
    let assets = [asset("icon-512.png", "512x512", "512x512")];

    let (outcome, bytes) = package(source, &mut manifest, &assets).await;

    assert_eq!(icon_src(&manifest, 1), "icons/icon-512.png");
    assert_eq!(icon_src(&manifest, 0), "original-0.png");
    assert_eq!(outcome.packaged, vec![PackagedAsset {
      name: "icon-512.png".to_string(),
      path: "icons/icon-512.png".to_string(),
      slot: 1,
    }]);
    assert_eq!(read_entry(bytes, "icons/icon-512.png"), Some(b"512".to_vec()));
  }

  #[tokio::test]
  async fn unmatched_asset_is_skipped_without_changes() {
    let mut manifest = manifest(&["192x192"]);
    let original = manifest.clone();
    let source = MemorySource::default().with_file("icon-96.png", b"96");
    let assets = [asset("icon-96.png", "96x96", "96x96")];

    let (outcome, bytes) = package(source, &mut manifest, &assets).await;

    assert_eq!(manifest, original);
    assert!(outcome.packaged.is_empty());
    assert_eq!(outcome.skipped[0].failure, AssetFailure::NoMatchingSlot {
      size: "96x96".to_string()
    });
    assert_eq!(read_entry(bytes, "icons/icon-96.png"), None);
  }

  #[tokio::test]
  async fn actual_size_selects_the_slot() {
    let mut manifest = manifest(&["192x192", "512x512"]);
    let source = MemorySource::default().with_file("icon.png", b"big");
    let assets = [asset("icon.png", "192x192", "512x512")];

    let (outcome, _) = package(source, &mut manifest, &assets).await;

    assert_eq!(outcome.packaged[0].slot, 1);
    assert_eq!(icon_src(&manifest, 0), "original-0.png");
    assert_eq!(icon_src(&manifest, 1), "icons/icon.png");
  }

  #[tokio::test]
  async fn fetch_failure_does_not_stop_other_assets() {
    let mut manifest = manifest(&["48x48", "192x192", "512x512"]);
    let source = MemorySource::default()
      .with_file("a.png", b"a")
      .with_failure("b.png")
      .with_file("c.png", b"c");
    let assets = [
      asset("a.png", "48x48", "48x48"),
      asset("b.png", "192x192", "192x192"),
      asset("c.png", "512x512", "512x512"),
    ];

    let (outcome, bytes) = package(source, &mut manifest, &assets).await;

    assert_eq!(icon_src(&manifest, 0), "icons/a.png");
    assert_eq!(icon_src(&manifest, 1), "original-1.png");
    assert_eq!(icon_src(&manifest, 2), "icons/c.png");
    assert_eq!(outcome.packaged.len(), 2);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].name, "b.png");
    assert!(matches!(outcome.skipped[0].failure, AssetFailure::Fetch { .. }));
    assert!(read_entry(bytes.clone(), "icons/c.png").is_some());
    assert!(read_entry(bytes, "icons/b.png").is_none());
  }

  #[tokio::test]
  async fn same_slot_collision_keeps_last_asset_in_list() {
    let mut manifest = manifest(&["192x192"]);
    let source = MemorySource::default()
      .with_file("first.png", b"1")
      .with_file("second.png", b"2");
    let assets = [
      asset("first.png", "192x192", "192x192"),
      asset("second.png", "192x192", "192x192"),
    ];

    let (outcome, _) = package(source, &mut manifest, &assets).await;

    assert_eq!(outcome.packaged.len(), 2);
    assert_eq!(icon_src(&manifest, 0), "icons/second.png");
  }

  #[tokio::test]
  async fn unsafe_names_never_reach_the_archive() {
    let mut manifest = manifest(&["192x192"]);
    let source = MemorySource::default().with_file("../escape.png", b"x");
    let assets = [asset("../escape.png", "192x192", "192x192")];

    let (outcome, _) = package(source, &mut manifest, &assets).await;

    assert_eq!(outcome.skipped[0].failure, AssetFailure::UnsafeName);
    assert_eq!(icon_src(&manifest, 0), "original-0.png");
  }

  #[tokio::test]
  async fn index_from_another_manifest_is_caught() {
    let mut manifest = manifest(&["192x192"]);
    let index = build_size_index(self::manifest(&["48x48", "192x192"]).images(ImageCategory::Icons));
    let source = MemorySource::default().with_file("icon.png", b"x");
    let packager = AssetPackager::new(Arc::new(source));
    let mut archive = ArchiveWriter::new();

    let outcome = packager
      .package_category(
        &mut archive,
        ImageCategory::Icons,
        &[asset("icon.png", "192x192", "192x192")],
        &mut manifest,
        &index,
      )
      .await;

    assert_eq!(outcome.skipped[0].failure, AssetFailure::SlotOutOfRange { slot: 1 });
    assert!(!archive.contains("icons/icon.png"));
    assert_eq!(icon_src(&manifest, 0), "original-0.png");
  }

  #[tokio::test]
  async fn asset_without_sizes_is_skipped() {
    let mut manifest = manifest(&["192x192"]);
    let source = MemorySource::default()
      .with_file("untagged.png", b"?")
      .with_file("icon.png", b"x");
    let assets = [
      GeneratedAsset {
        name: "untagged.png".to_string(),
        metadata: None,
      },
      asset("icon.png", "192x192", "192x192"),
    ];

    let (outcome, bytes) = package(source, &mut manifest, &assets).await;

    assert_eq!(outcome.skipped[0].name, "untagged.png");
    assert_eq!(outcome.skipped[0].failure, AssetFailure::MissingMetadata);
    assert_eq!(icon_src(&manifest, 0), "icons/icon.png");
    assert!(read_entry(bytes, "icons/untagged.png").is_none());
  }
}
