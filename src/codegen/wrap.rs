//! Module wrappers emitted into the script bundle.

use std::path::Path;

use serde_json::Value;

use crate::codegen::scanner::rewrite_references;
use crate::error::Result;
use crate::files::{BranchContext, ContentReader, FileRecord};
use crate::resolve::link_target;

/// Emit the registration text for `file`, or an empty string when the pipeline left it unused.
///
/// Script sources have their `require` calls linked first; static values are defined as-is.
/// Non-empty output always ends with a blank line.
pub fn finalize(
  context: &BranchContext<'_>,
  file: &mut FileRecord,
  dev: bool,
  reader: &dyn ContentReader,
) -> Result<String> {
  let Some(text) = file.output(reader)? else {
    return Ok(String::new());
  };

  let emitted = if file.define {
    define(&file.canonical_name, &text)
  } else {
    let js = link(context, &file.path, &text)?;
    register(&file.canonical_name, &js, &file.filename, dev)
  };

  Ok(format!("{emitted}\n\n"))
}

/// Rewrite the `require` calls of a source written at branch-relative path `from`.
///
/// Calls that already name a visible module are left as written.
pub fn link(context: &BranchContext<'_>, from: &str, source: &str) -> Result<String> {
  rewrite_references(source, |token| link_target(context, from, token))
}

/// `require.register` wrapper around a script body.
///
/// Development builds construct the module with `Function` so the `sourceURL` locator names
/// the original file in debuggers.
pub fn register(name: &str, js: &str, filename: &Path, dev: bool) -> String {
  if dev {
    let located = format!("{js}//@ sourceURL={}", filename.display());
    let quoted = Value::String(located).to_string().replace("\\n", "\\n\\\n");
    format!("require.register(\"{name}\", Function(\"exports, module\",\n{quoted}\n));")
  } else {
    format!("require.register(\"{name}\", function (exports, module) {{\n{js}\n}});")
  }
}

/// `require.define` of a static value literal.
pub fn define(name: &str, value: &str) -> String {
  format!("require.define(\"{name}\", {value});")
}
