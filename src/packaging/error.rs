//! Error types raised while assembling a package.

use serde::Serialize;
use thiserror::Error;

/// Setup-level failures that abort packaging as a whole.
#[derive(Debug, Error)]
pub enum PackagingError {
  /// The zip writer rejected an entry or failed to finalise.
  #[error("archive error: {0}")]
  Archive(#[from] zip::result::ZipError),
  /// Reading or writing the archive failed.
  #[error("archive I/O error: {0}")]
  Io(#[from] std::io::Error),
  /// The rewritten manifest could not be serialised.
  #[error("failed to serialise manifest: {0}")]
  Serialization(#[from] serde_json::Error),
  /// The same path was written to the archive twice.
  #[error("archive already contains an entry at {path}")]
  DuplicateEntry {
    /// Path that was already present.
    path: String,
  },
}

/// Reason a single asset was left out of the package.
///
/// These are recovered locally: the asset is logged and skipped while packaging continues.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AssetFailure {
  /// The asset name would escape its category directory.
  #[error("unsafe asset name")]
  UnsafeName,
  /// The listing gave neither sizes nor size tags for the asset.
  #[error("asset has no size metadata")]
  MissingMetadata,
  /// No manifest entry declares the asset's effective size.
  #[error("no manifest slot declares size {size}")]
  NoMatchingSlot {
    /// Effective size that was looked up.
    size: String,
  },
  /// The index pointed past the end of the manifest list.
  #[error("manifest slot {slot} is out of range")]
  SlotOutOfRange {
    /// Position returned by the size index.
    slot: usize,
  },
  /// The storage collaborator could not supply the bytes.
  #[error("failed to fetch asset bytes: {message}")]
  Fetch {
    /// Collaborator error rendered as text.
    message: String,
  },
  /// Writing the bytes into the archive failed.
  #[error("failed to write archive entry: {message}")]
  Write {
    /// Archive error rendered as text.
    message: String,
  },
}
