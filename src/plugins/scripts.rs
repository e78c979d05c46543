//! Stock stages for the script bundle roles.

use serde_json::Value;

use crate::files::{Contents, FileRecord};
use crate::plugins::{Transform, TransformContext};

/// Includes `.js` files as raw CommonJS source.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeJs;

impl Transform for IncludeJs {
  fn transform(&self, _context: &TransformContext<'_, '_>, file: &mut FileRecord) -> anyhow::Result<()> {
    if file.extension == "js" {
      file.contents = Contents::Raw;
    }
    Ok(())
  }
}

/// Defines `.json` files as static values.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonValue;

impl Transform for JsonValue {
  fn transform(&self, context: &TransformContext<'_, '_>, file: &mut FileRecord) -> anyhow::Result<()> {
    if file.extension != "json" {
      return Ok(());
    }
    let text = file.read(context.reader)?.to_string();
    file.contents = Contents::Text(text);
    file.define = true;
    Ok(())
  }
}

/// Defines any file as a JSON string literal of its text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringValue;

impl Transform for StringValue {
  fn transform(&self, context: &TransformContext<'_, '_>, file: &mut FileRecord) -> anyhow::Result<()> {
    let literal = Value::String(file.read(context.reader)?.to_string()).to_string();
    file.contents = Contents::Text(literal);
    file.define = true;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::BundleOptions;
  use crate::files::MemoryReader;
  use crate::models::{Branch, BranchRef, Role};
  use crate::plugins::test_support::single_role;

  fn run(stage: &dyn Transform, role: Role, path: &str, reader: &MemoryReader) -> FileRecord {
    let branch = Branch::new(BranchRef::local("boot"));
    let mut built = single_role(&branch, role, &[path]);
    let options = BundleOptions::default();
    let context = TransformContext {
      options: &options,
      branch: &built.context,
      reader,
    };
    let mut file = built.records.get_mut(&role).unwrap().remove(0);
    stage.transform(&context, &mut file).unwrap();
    file
  }

  #[test]
  fn js_files_are_included_without_reading() {
    let file = run(&IncludeJs, Role::Scripts, "index.js", &MemoryReader::new());
    assert_eq!(file.contents, Contents::Raw);
    assert!(!file.define);
    assert!(!file.is_loaded());
  }

  #[test]
  fn other_script_extensions_stay_unused() {
    let file = run(&IncludeJs, Role::Scripts, "index.coffee", &MemoryReader::new());
    assert_eq!(file.contents, Contents::Unused);
  }

  #[test]
  fn json_files_are_defined_verbatim() {
    let reader = MemoryReader::new().with_file("/w/data.json", "{\"a\": [1, 2]}");
    let file = run(&JsonValue, Role::Json, "data.json", &reader);
    assert_eq!(file.contents, Contents::Text("{\"a\": [1, 2]}".into()));
    assert!(file.define);
  }

  #[test]
  fn templates_are_defined_as_string_literals() {
    let reader = MemoryReader::new().with_file("/w/item.html", "<li class=\"item\">\n</li>");
    let file = run(&StringValue, Role::Templates, "item.html", &reader);
    assert_eq!(
      file.contents,
      Contents::Text("\"<li class=\\\"item\\\">\\n</li>\"".into())
    );
    assert!(file.define);
  }
}
