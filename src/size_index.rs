//! Size-keyed lookup from generated assets to manifest image slots.

use std::collections::HashMap;

use tracing::warn;

use crate::models::ImageResource;

/// Maps a declared `sizes` string to its position in one manifest image list.
///
/// Built once per category so that every asset lookup is a hash lookup rather than a scan of
/// the manifest list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeIndex {
  positions: HashMap<String, usize>,
  duplicates: Vec<String>,
}

impl SizeIndex {
  /// Position of the manifest entry declaring `size`, if any.
  pub fn lookup(&self, size: &str) -> Option<usize> {
    self.positions.get(size).copied()
  }

  /// Number of distinct sizes in the index.
  pub fn len(&self) -> usize {
    self.positions.len()
  }

  /// Returns `true` when the source list had no entries.
  pub fn is_empty(&self) -> bool {
    self.positions.is_empty()
  }

  /// Sizes declared more than once in the source list, in order of first repetition.
  pub fn duplicate_sizes(&self) -> &[String] {
    &self.duplicates
  }
}

/// Index a manifest image list by its `sizes` values.
///
/// Duplicate sizes resolve to the last entry declaring them. Entries without a string `sizes`
/// can never be matched and are left out.
// TODO: confirm with manifest authors whether duplicate sizes should be rejected instead.
pub fn build_size_index(resources: &[ImageResource]) -> SizeIndex {
  let mut index = SizeIndex::default();

  for (position, resource) in resources.iter().enumerate() {
    let Some(sizes) = resource.sizes.as_deref() else {
      continue;
    };
    if let Some(previous) = index.positions.insert(sizes.to_string(), position) {
      warn!(
        sizes,
        previous,
        position,
        "duplicate image size in manifest, keeping last entry"
      );
      if !index.duplicates.iter().any(|duplicate| duplicate == sizes) {
        index.duplicates.push(sizes.to_string());
      }
    }
  }

  index
}
