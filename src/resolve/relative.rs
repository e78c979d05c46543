//! Lookup of `./` references among the files of the requesting branch.

use log::trace;

use crate::error::{BundleError, Result};
use crate::files::{BranchContext, FileEntry};
use crate::resolve::paths::{join_path, strip_extension};

/// Suffixes tried, in order, when matching a reference against a file path.
pub const EXTENSIONS: [&str; 4] = ["", ".js", ".json", "/index.js"];

/// Resolve a relative `token` written in the file at `from`.
///
/// Every candidate is tried with the first suffix before any is tried with the next, so the
/// suffix order decides between files that differ only by extension. Files whose path minus
/// its extension equals the target are the last resort, taken in discovery order.
pub fn lookup_relative(context: &BranchContext<'_>, from: &str, token: &str) -> Result<String> {
  let target = join_path(from, token);
  let files = &context.all;

  let found = EXTENSIONS
    .iter()
    .find_map(|extension| {
      files
        .iter()
        .find(|file| matches_with_suffix(&file.path, &target, extension))
    })
    .or_else(|| files.iter().find(|file| strip_extension(&file.path) == target));

  match found {
    Some(FileEntry { canonical_name, path }) => {
      trace!("{}: {token} -> {path} ({canonical_name})", context.name);
      Ok(canonical_name.clone())
    }
    None => Err(BundleError::UnresolvedReference {
      token: token.to_string(),
      component: context.name.clone(),
      path: from.to_string(),
    }),
  }
}

fn matches_with_suffix(path: &str, target: &str, suffix: &str) -> bool {
  path
    .strip_prefix(target)
    .is_some_and(|rest| rest == suffix)
}
