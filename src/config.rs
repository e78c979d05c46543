//! Bundle options loader.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "component-bundle.json";

/// Options consumed by the bundling core.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BundleOptions {
  /// Wrap modules with `Function(...)` and a `sourceURL` locator instead of plain closures.
  pub dev: bool,
  /// Public URL prefix asset references are rewritten against.
  pub url_prefix: String,
  /// Prepend the `require` runtime to script bundles.
  pub require: bool,
  /// Directory installed branches live in when they carry no explicit path.
  pub components_dir: PathBuf,
}

impl Default for BundleOptions {
  fn default() -> Self {
    Self {
      dev: false,
      url_prefix: String::new(),
      require: true,
      components_dir: PathBuf::from("components"),
    }
  }
}

impl BundleOptions {
  /// Attempt to load options from the provided directory.
  ///
  /// A missing or malformed file yields the defaults.
  pub fn discover(dir: &Path) -> Self {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    Self::from_path(&candidate).unwrap_or_default()
  }

  /// Read options from a specific JSON file.
  pub fn from_path(path: &Path) -> Option<Self> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
  }
}
