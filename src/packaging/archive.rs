//! In-memory zip archive that receives packaged assets.

use std::collections::BTreeSet;
use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::error::PackagingError;

/// Single-writer handle over the output archive.
///
/// Acquired once per package build and consumed by [`ArchiveWriter::finish`]. Writers only
/// ever hand out `&mut self`, so concurrent fetches must funnel their bytes through one loop.
pub struct ArchiveWriter {
  zip: ZipWriter<Cursor<Vec<u8>>>,
  entries: BTreeSet<String>,
}

impl ArchiveWriter {
  /// Open an empty archive.
  pub fn new() -> Self {
    Self {
      zip: ZipWriter::new(Cursor::new(Vec::new())),
      entries: BTreeSet::new(),
    }
  }

  /// Write one file into the archive.
  pub fn write_entry(&mut self, path: &str, bytes: &[u8]) -> Result<(), PackagingError> {
    if self.entries.contains(path) {
      return Err(PackagingError::DuplicateEntry {
        path: path.to_string(),
      });
    }

    self.zip.start_file(path, SimpleFileOptions::default())?;
    self.zip.write_all(bytes)?;
    self.entries.insert(path.to_string());
    Ok(())
  }

  /// Returns `true` when an entry was written at `path`.
  pub fn contains(&self, path: &str) -> bool {
    self.entries.contains(path)
  }

  /// Paths written so far, sorted.
  pub fn entries(&self) -> impl Iterator<Item = &str> {
    self.entries.iter().map(String::as_str)
  }

  /// Finalise the central directory and return the archive bytes.
  pub fn finish(self) -> Result<Vec<u8>, PackagingError> {
    let cursor = self.zip.finish()?;
    Ok(cursor.into_inner())
  }
}

impl Default for ArchiveWriter {
  fn default() -> Self {
    Self::new()
  }
}

impl std::fmt::Debug for ArchiveWriter {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ArchiveWriter")
      .field("entries", &self.entries)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Read;
  use zip::ZipArchive;

  #[test]
  fn writes_readable_entries() {
    let mut writer = ArchiveWriter::new();
    writer.write_entry("icons/a.png", b"png-bytes").unwrap();
    assert!(writer.contains("icons/a.png"));

    let bytes = writer.finish().unwrap();
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut content = Vec::new();
    archive
      .by_name("icons/a.png")
      .unwrap()
      .read_to_end(&mut content)
      .unwrap();
    assert_eq!(content, b"png-bytes");
  }

  #[test]
  fn rejects_duplicate_entries() {
    let mut writer = ArchiveWriter::new();
    writer.write_entry("icons/a.png", b"first").unwrap();

    let err = writer.write_entry("icons/a.png", b"second").unwrap_err();
    assert!(matches!(err, PackagingError::DuplicateEntry { .. }));
    assert_eq!(writer.entries().collect::<Vec<_>>(), vec!["icons/a.png"]);
  }
}
