//! Lookup of bare references through a branch's dependency aliases and locals.

use log::trace;

use crate::error::{BundleError, Result};
use crate::files::BranchContext;

/// Resolve a bare `token` for the branch described by `context`.
///
/// Rules run in a fixed order and the first that applies wins:
///
/// 1. tokens containing both `/` and `@` are taken as already qualified;
/// 2. the package segment of an alias (`emitter` for `acme/emitter`);
/// 3. the alias itself;
/// 4. a locally declared name, returned unchanged;
/// 5. the `owner-package` spelling of an alias.
///
/// Dependency rules run before the locals check, so a name that is both an alias package
/// segment and a local resolves to the dependency.
pub fn lookup_dependency(context: &BranchContext<'_>, token: &str) -> Result<String> {
  if token.contains('/') && token.contains('@') {
    trace!("{}: {token} is already qualified", context.name);
    return Ok(token.to_string());
  }

  let dependencies = &context.branch.dependencies;

  if let Some(target) = dependencies
    .iter()
    .find(|(alias, _)| alias.split('/').nth(1) == Some(token))
    .map(|(_, target)| target)
  {
    trace!("{}: {token} -> {target} (package name)", context.name);
    return Ok(target.canonical_name());
  }

  if let Some(target) = dependencies.get(token) {
    trace!("{}: {token} -> {target} (alias)", context.name);
    return Ok(target.canonical_name());
  }

  if context.branch.locals.contains(token) {
    trace!("{}: {token} is local", context.name);
    return Ok(token.to_string());
  }

  let hyphenated = token.replace('/', "-");
  if let Some(target) = dependencies
    .iter()
    .find(|(alias, _)| alias.replace('/', "-") == hyphenated)
    .map(|(_, target)| target)
  {
    trace!("{}: {token} -> {target} (hyphenated alias)", context.name);
    return Ok(target.canonical_name());
  }

  Err(BundleError::UnresolvedDependency {
    token: token.to_string(),
    component: context.name.clone(),
  })
}
