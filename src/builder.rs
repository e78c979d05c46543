//! Branch driver: runs every file of every branch through its pipeline and concatenates the
//! finalized output.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::codegen;
use crate::config::BundleOptions;
use crate::error::{BundleError, Result};
use crate::files::{BranchContext, ContentReader, FileRecord, FsReader, build_branch_files};
use crate::models::{BranchInput, Role};
use crate::plugins::{Pipeline, TransformContext};

/// Builds one bundle (scripts or styles) from a list of branches.
pub struct Bundler {
  options: BundleOptions,
  roles: Vec<Role>,
  pipelines: BTreeMap<Role, Pipeline>,
  preamble: bool,
  reader: Box<dyn ContentReader>,
}

impl Bundler {
  fn new(options: BundleOptions, roles: &[Role], preamble: bool) -> Self {
    let pipelines = roles
      .iter()
      .map(|&role| (role, Pipeline::for_role(role)))
      .collect();
    Self {
      options,
      roles: roles.to_vec(),
      pipelines,
      preamble,
      reader: Box::new(FsReader),
    }
  }

  /// Script bundle over the scripts, json and templates roles.
  ///
  /// The `require` runtime is prepended unless `options.require` is false.
  pub fn scripts(options: BundleOptions) -> Self {
    let preamble = options.require;
    Self::new(options, &Role::SCRIPT_ROLES, preamble)
  }

  /// Style bundle over the styles role.
  pub fn styles(options: BundleOptions) -> Self {
    Self::new(options, &Role::STYLE_ROLES, false)
  }

  /// Replace the pipeline used for `role`.
  pub fn with_pipeline(mut self, role: Role, pipeline: Pipeline) -> Self {
    self.pipelines.insert(role, pipeline);
    self
  }

  /// Read file content through `reader` instead of the filesystem.
  pub fn with_reader(mut self, reader: impl ContentReader + 'static) -> Self {
    self.reader = Box::new(reader);
    self
  }

  /// Options the bundle is built with.
  pub fn options(&self) -> &BundleOptions {
    &self.options
  }

  /// Bundle `inputs` in order.
  ///
  /// The first failure aborts the build; no partial output is returned.
  pub fn build(&self, inputs: &[BranchInput]) -> Result<String> {
    let mut output = if self.preamble {
      codegen::preamble()
    } else {
      String::new()
    };
    let mut names = BTreeSet::new();

    for input in inputs {
      output.push_str(&self.bundle_branch(input, &mut names)?);
    }

    Ok(output)
  }

  /// Bundle a single branch, recording registered names in `names`.
  pub fn bundle_branch(&self, input: &BranchInput, names: &mut BTreeSet<String>) -> Result<String> {
    let branch = &input.branch;
    let base_path = branch.base_path(&self.options.components_dir);
    let mut built = build_branch_files(branch, base_path, &self.roles, &input.files);
    let context = &built.context;
    debug!(
      "bundling {} from {} ({} files)",
      context.name,
      context.base_path.display(),
      context.all.len()
    );

    let mut output = String::new();
    for role in &self.roles {
      let Some(records) = built.records.get_mut(role) else {
        continue;
      };
      for file in records.iter_mut() {
        let text = self.process(*role, context, file)?;
        if text.is_empty() {
          continue;
        }
        if role.is_registered() && !names.insert(file.canonical_name.clone()) {
          return Err(BundleError::DuplicateName {
            name: file.canonical_name.clone(),
            path: file.path.clone(),
          });
        }
        output.push_str(&text);
      }
    }

    debug!("bundled {} ({} bytes)", context.name, output.len());
    Ok(output)
  }

  fn process(&self, role: Role, context: &BranchContext<'_>, file: &mut FileRecord) -> Result<String> {
    if let Some(pipeline) = self.pipelines.get(&role) {
      let transform_context = TransformContext {
        options: &self.options,
        branch: context,
        reader: self.reader.as_ref(),
      };
      pipeline
        .run(&transform_context, file)
        .map_err(|source| match source.downcast::<BundleError>() {
          Ok(err) => err,
          Err(source) => BundleError::Transform {
            path: file.filename.clone(),
            source,
          },
        })?;
    }

    match role {
      Role::Scripts | Role::Json | Role::Templates => {
        codegen::finalize(context, file, self.options.dev, self.reader.as_ref())
      }
      Role::Styles => Ok(
        file
          .output(self.reader.as_ref())?
          .map(|text| format!("{text}\n\n"))
          .unwrap_or_default(),
      ),
    }
  }
}

impl std::fmt::Debug for Bundler {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Bundler")
      .field("options", &self.options)
      .field("roles", &self.roles)
      .field("pipelines", &self.pipelines)
      .field("preamble", &self.preamble)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use std::fs;

  use anyhow::anyhow;
  use pretty_assertions::assert_eq;
  use tempfile::tempdir;

  use super::*;
  use crate::codegen::REQUIRE_RUNTIME;
  use crate::files::{Contents, MemoryReader};
  use crate::models::{Branch, BranchRef, RoleFiles};
  use crate::plugins::Transform;

  fn input(branch: Branch, files: Vec<(Role, Vec<&str>)>) -> BranchInput {
    let mut role_files = RoleFiles::new();
    for (role, paths) in files {
      role_files.insert(role, paths.into_iter().map(str::to_string).collect());
    }
    BranchInput {
      branch,
      files: role_files,
    }
  }

  fn release() -> BundleOptions {
    BundleOptions {
      require: false,
      ..BundleOptions::default()
    }
  }

  fn widget() -> BranchInput {
    input(
      Branch::new(BranchRef::local("acme/widget"))
        .with_main("lib/index.js")
        .with_path("/w")
        .with_dependency("acme/emitter", BranchRef::remote("acme/emitter", "1.0.0")),
      vec![
        (Role::Scripts, vec!["lib/index.js", "lib/helpers.js"]),
        (Role::Json, vec!["lib/data.json"]),
        (Role::Templates, vec!["lib/item.html"]),
      ],
    )
  }

  fn emitter() -> BranchInput {
    input(
      Branch::new(BranchRef::remote("acme/emitter", "1.0.0")).with_path("/e"),
      vec![(Role::Scripts, vec!["index.js"])],
    )
  }

  fn reader() -> MemoryReader {
    MemoryReader::new()
      .with_file("/e/index.js", "module.exports = Emitter;")
      .with_file(
        "/w/lib/index.js",
        "var helpers = require('./helpers');\nvar Emitter = require('emitter');\nvar data = require('./data');",
      )
      .with_file("/w/lib/helpers.js", "module.exports = {};")
      .with_file("/w/lib/data.json", "{\"size\":3}")
      .with_file("/w/lib/item.html", "<li></li>")
  }

  #[test]
  fn concatenates_branches_in_order_without_preamble() {
    let bundler = Bundler::scripts(release()).with_reader(reader());
    let output = bundler.build(&[emitter(), widget()]).unwrap();

    assert_eq!(
      output,
      "require.register(\"acme/emitter@1.0.0\", function (exports, module) {\n\
module.exports = Emitter;\n\
});\n\n\
require.register(\"acme/widget\", function (exports, module) {\n\
var helpers = require(\"acme/widget/helpers.js\");\n\
var Emitter = require(\"acme/emitter@1.0.0\");\n\
var data = require(\"acme/widget/data.json\");\n\
});\n\n\
require.register(\"acme/widget/helpers.js\", function (exports, module) {\n\
module.exports = {};\n\
});\n\n\
require.define(\"acme/widget/data.json\", {\"size\":3});\n\n\
require.define(\"acme/widget/item.html\", \"<li></li>\");\n\n"
    );
  }

  #[test]
  fn prepends_runtime_when_enabled() {
    let bundler = Bundler::scripts(BundleOptions::default()).with_reader(reader());
    let output = bundler.build(&[emitter()]).unwrap();
    assert!(output.starts_with(&format!("{REQUIRE_RUNTIME}\n\n")));
    assert!(output.ends_with("});\n\n"));
  }

  #[test]
  fn empty_build_with_runtime_is_just_the_preamble() {
    let bundler = Bundler::scripts(BundleOptions::default()).with_reader(reader());
    assert_eq!(bundler.build(&[]).unwrap(), codegen::preamble());
  }

  #[test]
  fn dev_mode_uses_function_wrappers() {
    let options = BundleOptions {
      dev: true,
      ..release()
    };
    let bundler = Bundler::scripts(options).with_reader(reader());
    let output = bundler.build(&[emitter()]).unwrap();
    assert_eq!(
      output,
      "require.register(\"acme/emitter@1.0.0\", Function(\"exports, module\",\n\
\"module.exports = Emitter;//@ sourceURL=/e/index.js\"\n\
));\n\n"
    );
  }

  #[test]
  fn unresolved_reference_aborts_the_build() {
    let reader = MemoryReader::new().with_file("/w/index.js", "require('./missing');");
    let broken = input(
      Branch::new(BranchRef::local("acme/widget")).with_path("/w"),
      vec![(Role::Scripts, vec!["index.js"])],
    );

    let err = Bundler::scripts(release())
      .with_reader(reader)
      .build(&[broken])
      .unwrap_err();
    match err {
      BundleError::UnresolvedReference { token, component, path } => {
        assert_eq!(token, "./missing");
        assert_eq!(component, "acme/widget");
        assert_eq!(path, "index.js");
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn unresolved_dependency_aborts_the_build() {
    let reader = MemoryReader::new().with_file("/w/index.js", "require('jquery');");
    let broken = input(
      Branch::new(BranchRef::local("app")).with_path("/w"),
      vec![(Role::Scripts, vec!["index.js"])],
    );

    let err = Bundler::scripts(release())
      .with_reader(reader)
      .build(&[broken])
      .unwrap_err();
    assert!(matches!(err, BundleError::UnresolvedDependency { .. }));
  }

  #[test]
  fn duplicate_registered_names_are_rejected() {
    let reader = MemoryReader::new()
      .with_file("/w/lib/index.js", "")
      .with_file("/w/lib/a.js", "")
      .with_file("/w/a.js", "");
    let clash = input(
      Branch::new(BranchRef::local("app")).with_main("lib/index.js").with_path("/w"),
      vec![(Role::Scripts, vec!["lib/index.js", "lib/a.js", "a.js"])],
    );

    let err = Bundler::scripts(release())
      .with_reader(reader)
      .build(&[clash])
      .unwrap_err();
    match err {
      BundleError::DuplicateName { name, path } => {
        assert_eq!(name, "app/a.js");
        assert_eq!(path, "a.js");
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn missing_content_surfaces_read_error() {
    let broken = input(
      Branch::new(BranchRef::local("app")).with_path("/w"),
      vec![(Role::Json, vec!["data.json"])],
    );

    let err = Bundler::scripts(release())
      .with_reader(MemoryReader::new())
      .build(&[broken])
      .unwrap_err();
    assert!(matches!(err, BundleError::Read { .. }));
  }

  #[test]
  fn stage_failures_name_the_file() {
    struct Reject;
    impl Transform for Reject {
      fn transform(&self, _context: &TransformContext<'_, '_>, _file: &mut FileRecord) -> anyhow::Result<()> {
        Err(anyhow!("rejected"))
      }
    }

    let bundler = Bundler::scripts(release())
      .with_reader(reader())
      .with_pipeline(Role::Scripts, Pipeline::new().with(Reject));
    let err = bundler.build(&[emitter()]).unwrap_err();
    match err {
      BundleError::Transform { path, source } => {
        assert_eq!(path, std::path::PathBuf::from("/e/index.js"));
        assert_eq!(source.to_string(), "rejected");
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn files_claimed_by_no_stage_are_omitted() {
    struct Discard;
    impl Transform for Discard {
      fn transform(&self, _context: &TransformContext<'_, '_>, file: &mut FileRecord) -> anyhow::Result<()> {
        file.contents = Contents::Unused;
        Ok(())
      }
    }

    let bundler = Bundler::scripts(release())
      .with_reader(reader())
      .with_pipeline(Role::Scripts, Pipeline::new().with(crate::plugins::IncludeJs).with(Discard));
    assert_eq!(bundler.build(&[emitter()]).unwrap(), "");
  }

  #[test]
  fn style_bundle_rewrites_urls_from_disk() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("widget");
    fs::create_dir_all(root.join("css")).unwrap();
    fs::write(
      root.join("css/widget.css"),
      ".logo { background: url(../img/logo.png); }",
    )
    .unwrap();
    fs::write(root.join("print.css"), "body { color: black; }").unwrap();

    let options = BundleOptions {
      url_prefix: "https://cdn.example.com/".into(),
      ..BundleOptions::default()
    };
    let widget = input(
      Branch::new(BranchRef::local("acme/widget")).with_path(&root),
      vec![(Role::Styles, vec!["css/widget.css", "print.css"])],
    );

    let output = Bundler::styles(options).build(&[widget]).unwrap();
    assert_eq!(
      output,
      ".logo { background: url(\"https://cdn.example.com/acme-widget/img/logo.png\"); }\n\n\
body { color: black; }\n\n"
    );
  }

  #[test]
  fn installed_branches_are_read_from_components_dir() {
    let dir = tempdir().unwrap();
    let installed = dir.path().join("acme").join("emitter").join("1.0.0");
    fs::create_dir_all(&installed).unwrap();
    fs::write(installed.join("index.js"), "module.exports = 1;").unwrap();

    let options = BundleOptions {
      components_dir: dir.path().to_path_buf(),
      ..release()
    };
    let branch = input(
      Branch::new(BranchRef::remote("acme/emitter", "1.0.0")),
      vec![(Role::Scripts, vec!["index.js"])],
    );

    let output = Bundler::scripts(options).build(&[branch]).unwrap();
    assert!(output.contains("require.register(\"acme/emitter@1.0.0\""));
    assert!(output.contains("module.exports = 1;"));
  }
}
