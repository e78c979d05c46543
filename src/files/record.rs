//! File records and their lazily loaded content.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BundleError, Result};
use crate::models::Role;

/// Source of file text, addressed by absolute path.
pub trait ContentReader {
  /// Read the whole file at `path` as UTF-8 text.
  fn read(&self, path: &Path) -> std::io::Result<String>;
}

/// Reads files straight from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl ContentReader for FsReader {
  fn read(&self, path: &Path) -> std::io::Result<String> {
    fs::read_to_string(path)
  }
}

/// In-memory reader keyed by absolute path.
#[derive(Debug, Clone, Default)]
pub struct MemoryReader {
  files: BTreeMap<PathBuf, String>,
}

impl MemoryReader {
  /// Create an empty reader.
  pub fn new() -> Self {
    Self::default()
  }

  /// Register `text` under `path`, returning the reader for chaining.
  pub fn with_file(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
    self.files.insert(path.into(), text.into());
    self
  }
}

impl ContentReader for MemoryReader {
  fn read(&self, path: &Path) -> std::io::Result<String> {
    self.files.get(path).cloned().ok_or_else(|| {
      std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("{} is not registered", path.display()),
      )
    })
  }
}

/// What a file contributes to the output once the pipeline has run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Contents {
  /// No stage claimed the file; it is left out of the bundle.
  #[default]
  Unused,
  /// Include the file's source as read from disk.
  Raw,
  /// Include this text in place of the source.
  Text(String),
}

/// One physical file belonging to a branch.
#[derive(Debug, Clone)]
pub struct FileRecord {
  /// Path within the branch, as discovered.
  pub path: String,
  /// Path with the entry's directory prefix stripped.
  pub resolved_path: String,
  /// Name the file is registered under in the module registry.
  pub canonical_name: String,
  /// Absolute path used for reads and debug locators.
  pub filename: PathBuf,
  /// Text after the final `.` of the path.
  pub extension: String,
  /// Output category of the file.
  pub role: Role,
  /// Output decision made by the pipeline.
  pub contents: Contents,
  /// Register as a static value with `require.define` instead of a closure.
  pub define: bool,
  source: Option<String>,
}

impl FileRecord {
  pub(crate) fn new(
    path: String,
    resolved_path: String,
    canonical_name: String,
    filename: PathBuf,
    role: Role,
  ) -> Self {
    let extension = path.rsplit('.').next().unwrap_or_default().to_string();
    Self {
      path,
      resolved_path,
      canonical_name,
      filename,
      extension,
      role,
      contents: Contents::Unused,
      define: false,
      source: None,
    }
  }

  /// Source text, read through `reader` on first access and cached afterwards.
  pub fn read(&mut self, reader: &dyn ContentReader) -> Result<&str> {
    if self.source.is_none() {
      let text = reader.read(&self.filename).map_err(|source| BundleError::Read {
        path: self.filename.clone(),
        source,
      })?;
      self.source = Some(text);
    }
    Ok(self.source.as_deref().unwrap_or_default())
  }

  /// Whether the source has been loaded.
  pub fn is_loaded(&self) -> bool {
    self.source.is_some()
  }

  /// Text to emit, or `None` when the file was left unused.
  pub fn output(&mut self, reader: &dyn ContentReader) -> Result<Option<String>> {
    match &self.contents {
      Contents::Unused => Ok(None),
      Contents::Text(text) => Ok(Some(text.clone())),
      Contents::Raw => self.read(reader).map(|text| Some(text.to_string())),
    }
  }
}

/// Lookup entry in a branch's flattened file list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
  /// Path within the branch.
  pub path: String,
  /// Registered name of the file.
  pub canonical_name: String,
}
