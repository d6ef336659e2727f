//! Packaging generated images into a zip archive alongside the rewritten manifest.

mod archive;
mod error;
mod packager;
mod source;

pub use archive::ArchiveWriter;
pub use error::{AssetFailure, PackagingError};
pub use packager::{
  AssetPackager, CategoryOutcome, DEFAULT_MAX_CONCURRENT_FETCHES, PackagedAsset, SkippedAsset,
};
pub use source::{AssetSource, DirectoryAssetSource};
