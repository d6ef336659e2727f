use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use super::response::{STATUS_BAD_REQUEST, ServiceResponse};
use crate::validation::{ValidationReport, validate_manifest};

/// Collaborator that resolves a site's manifest link and downloads the manifest.
#[async_trait]
pub trait ManifestFetcher: Send + Sync {
  /// Fetch the parsed manifest for `site`; `Ok(None)` when the site declares none.
  async fn fetch_manifest(&self, site: &str) -> Result<Option<Value>>;
}

/// Fetcher that treats the site as a path below a local root directory.
#[derive(Debug, Clone)]
pub struct FileManifestFetcher {
  root: PathBuf,
}

impl FileManifestFetcher {
  /// Resolve sites relative to `root`.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }
}

#[async_trait]
impl ManifestFetcher for FileManifestFetcher {
  async fn fetch_manifest(&self, site: &str) -> Result<Option<Value>> {
    let path = self.root.join(site);
    let content = match tokio::fs::read_to_string(&path).await {
      Ok(content) => content,
      Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
      Err(err) => {
        return Err(err).with_context(|| format!("failed to read {}", path.display()));
      }
    };

    let manifest = serde_json::from_str(&content)
      .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(Some(manifest))
  }
}

/// Fetch and validate the manifest of `site`.
///
/// A site without a manifest is a successful response with `data: null`; a fetch failure is a
/// 400 carrying the error chain.
pub async fn validate_site<F>(fetcher: &F, site: &str) -> ServiceResponse<ValidationReport>
where
  F: ManifestFetcher + ?Sized,
{
  info!(site, "validating web manifest");

  match fetcher.fetch_manifest(site).await {
    Ok(Some(manifest)) => ServiceResponse::ok(validate_manifest(&manifest)),
    Ok(None) => {
      info!(site, "site declares no web manifest");
      ServiceResponse::empty()
    }
    Err(err) => {
      warn!(site, error = %format!("{err:#}"), "failed to fetch web manifest");
      ServiceResponse::error(STATUS_BAD_REQUEST, &err)
    }
  }
}
