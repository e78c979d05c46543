//! Reference resolution: map a token written in a file to a registered module name.
//!
//! Tokens starting with `./` are looked up among the files of the requesting branch, every
//! other token goes through the dependency rules. Lookups are read-only over the
//! [`BranchContext`](crate::files::BranchContext).

mod dependency;
pub mod paths;
mod relative;

pub use dependency::lookup_dependency;
pub use relative::{EXTENSIONS, lookup_relative};

use crate::error::Result;
use crate::files::BranchContext;

/// Resolve `token` written in the file at branch-relative path `from`.
pub fn lookup(context: &BranchContext<'_>, from: &str, token: &str) -> Result<String> {
  if token.starts_with("./") {
    lookup_relative(context, from, token)
  } else {
    lookup_dependency(context, token)
  }
}

/// Name a `require` call should be rewritten to, or `None` when it already names its module.
///
/// Bare tokens run through the dependency rules first. A token those rules map to itself is
/// kept as written. When the rules fail, a token that is exactly a registered name of this
/// branch's files or of a dependency is kept as well, so already linked output links to
/// itself. Anything else is an error.
pub fn link_target(context: &BranchContext<'_>, from: &str, token: &str) -> Result<Option<String>> {
  if token.starts_with("./") {
    return lookup_relative(context, from, token).map(Some);
  }

  match lookup_dependency(context, token) {
    Ok(name) if name == token => Ok(None),
    Ok(name) => Ok(Some(name)),
    Err(err) => {
      let own_file = context.all.iter().any(|file| file.canonical_name == token);
      let dependency = context
        .branch
        .dependencies
        .values()
        .any(|target| target.canonical_name() == token);
      if own_file || dependency { Ok(None) } else { Err(err) }
    }
  }
}
