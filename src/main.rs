//! Command line entry point for validating manifests and packaging generated images.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use same_file::is_same_file;
use tracing_subscriber::EnvFilter;

use pwa_packager::manifest::{load_asset_listing, load_web_manifest};
use pwa_packager::packaging::DirectoryAssetSource;
use pwa_packager::service::{FileManifestFetcher, validate_site};
use pwa_packager::{PackageBuilder, PackageRequest, PackagerConfig};

#[derive(Debug, Parser)]
#[command(name = "pwa-packager", version, about = "Validate and package Progressive Web App manifests")]
struct Cli {
  /// Configuration file; defaults to `pwa-packager.config.json` in the working directory.
  #[arg(long, global = true)]
  config: Option<PathBuf>,
  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Check a manifest against the required and recommended members.
  Validate {
    /// Path to the manifest JSON file.
    manifest: PathBuf,
  },
  /// Package generated icons and screenshots together with the rewritten manifest.
  Package {
    /// Path to the manifest JSON file.
    manifest: PathBuf,
    /// Directory holding the generated images and their listing.
    #[arg(long)]
    assets: PathBuf,
    /// Output archive path.
    #[arg(long)]
    out: Option<PathBuf>,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let config = match &cli.config {
    Some(path) => PackagerConfig::from_path(path)
      .with_context(|| format!("failed to load configuration from {}", path.display()))?,
    None => PackagerConfig::discover(Path::new(".")),
  };

  match cli.command {
    Command::Validate { manifest } => validate(&manifest).await,
    Command::Package {
      manifest,
      assets,
      out,
    } => {
      let out = out.unwrap_or_else(|| PathBuf::from(&config.output_archive));
      package(&config, &manifest, &assets, &out).await
    }
  }
}

async fn validate(manifest: &Path) -> Result<()> {
  let root = manifest.parent().unwrap_or_else(|| Path::new("."));
  let file_name = manifest
    .file_name()
    .context("manifest path has no file name")?
    .to_string_lossy();

  let response = validate_site(&FileManifestFetcher::new(root), &file_name).await;
  println!("{}", serde_json::to_string_pretty(&response)?);

  if !response.is_success() {
    bail!("manifest validation failed with status {}", response.status);
  }
  Ok(())
}

async fn package(config: &PackagerConfig, manifest: &Path, assets: &Path, out: &Path) -> Result<()> {
  if out.exists()
    && is_same_file(manifest, out)
      .with_context(|| format!("failed to compare {} with {}", manifest.display(), out.display()))?
  {
    bail!("refusing to overwrite the input manifest {}", manifest.display());
  }

  let web_manifest = load_web_manifest(manifest)?;
  let listing = load_asset_listing(&config.asset_listing_path(assets))?;

  let builder = PackageBuilder::new(Arc::new(DirectoryAssetSource::new(assets)), config);
  let result = builder
    .build(PackageRequest::from_listing(web_manifest, listing))
    .await
    .context("failed to assemble package")?;
  result.write_to(out)?;

  println!("{}", serde_json::to_string_pretty(&result.summary)?);
  Ok(())
}
