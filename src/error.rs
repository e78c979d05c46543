//! Error taxonomy shared by the resolver, the code generator and the branch driver.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used by the bundling core.
pub type Result<T> = std::result::Result<T, BundleError>;

/// Fatal failures raised while bundling a branch.
///
/// Every variant aborts the build; there is no partial-output recovery.
#[derive(Debug, Error)]
pub enum BundleError {
  /// A `./` reference matched no file of the requesting branch.
  #[error("could not resolve \"{token}\" from \"{component}\"'s file \"{path}\"")]
  UnresolvedReference {
    /// Reference exactly as written in the source.
    token: String,
    /// Canonical name of the branch owning the requesting file.
    component: String,
    /// Branch-relative path of the requesting file.
    path: String,
  },

  /// A bare reference matched no alias, local or fully qualified name.
  #[error("could not resolve \"{token}\" from component \"{component}\".")]
  UnresolvedDependency {
    /// Reference exactly as written in the source.
    token: String,
    /// Canonical name of the requesting branch.
    component: String,
  },

  /// The lazy content accessor failed to read a file.
  #[error("failed to read {}", path.display())]
  Read {
    /// Absolute path that was read.
    path: PathBuf,
    /// Underlying I/O error.
    #[source]
    source: std::io::Error,
  },

  /// Two files of one bundle share a canonical name.
  #[error("duplicate module name \"{name}\" registered by \"{path}\"")]
  DuplicateName {
    /// Colliding canonical name.
    name: String,
    /// Branch-relative path of the second file claiming the name.
    path: String,
  },

  /// A pipeline stage failed for a file.
  #[error("transform failed for \"{}\": {source}", path.display())]
  Transform {
    /// Absolute path of the file being transformed.
    path: PathBuf,
    /// Error reported by the stage.
    source: anyhow::Error,
  },
}
