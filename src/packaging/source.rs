//! Byte retrieval for generated assets.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;

/// Storage collaborator that supplies the bytes of a generated asset by name.
///
/// Retries and timeouts belong to implementations; the packager treats any error as terminal
/// for that one asset.
#[async_trait]
pub trait AssetSource: Send + Sync {
  /// Download the asset stored under `name`.
  async fn fetch(&self, name: &str) -> Result<Vec<u8>>;
}

/// Asset source backed by a local directory, with asset names resolved relative to its root.
#[derive(Debug, Clone)]
pub struct DirectoryAssetSource {
  root: PathBuf,
}

impl DirectoryAssetSource {
  /// Serve assets from `root`.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }
}

#[async_trait]
impl AssetSource for DirectoryAssetSource {
  async fn fetch(&self, name: &str) -> Result<Vec<u8>> {
    let path = self.root.join(name);
    tokio::fs::read(&path)
      .await
      .with_context(|| format!("failed to read {}", path.display()))
  }
}
