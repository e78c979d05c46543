//! Data structures describing the branches handed to the bundler.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Entry file assumed when a branch does not declare one.
pub const DEFAULT_MAIN: &str = "index.js";

/// Identity of a resolved package version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct BranchRef {
  /// Package name, `<owner>/<package>` for remote branches or a bare local name.
  pub name: String,
  /// Version reference; absent for local branches.
  #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
  pub reference: Option<String>,
}

impl BranchRef {
  /// Remote branch pinned at `reference`.
  pub fn remote(name: impl Into<String>, reference: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      reference: Some(reference.into()),
    }
  }

  /// Local branch without a version.
  pub fn local(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      reference: None,
    }
  }

  /// Name the branch's entry is registered under: `<name>` or `<name>@<ref>`.
  pub fn canonical_name(&self) -> String {
    match &self.reference {
      Some(reference) => format!("{}@{}", self.name, reference),
      None => self.name.clone(),
    }
  }

  /// Owner-repo identifier used as the public asset folder, e.g. `acme-widget`.
  pub fn asset_segment(&self) -> String {
    self.name.replace('/', "-")
  }

  /// Folder below the components directory holding this branch's files.
  pub fn folder(&self) -> PathBuf {
    let mut folder = PathBuf::new();
    for segment in self.name.split('/').filter(|segment| !segment.is_empty()) {
      folder.push(segment);
    }
    if let Some(reference) = &self.reference {
      folder.push(reference);
    }
    folder
  }
}

impl fmt::Display for BranchRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.canonical_name())
  }
}

/// A resolved package version participating in the bundle.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Branch {
  /// Identity of the branch.
  #[serde(flatten)]
  pub id: BranchRef,
  /// Declared main file, relative to the branch root.
  #[serde(default)]
  pub main: Option<String>,
  /// Dependency alias (`<owner>/<package>`) to referenced branch, in declaration order.
  #[serde(default)]
  pub dependencies: IndexMap<String, BranchRef>,
  /// Bare module names declared locally and allowed as-is.
  #[serde(default)]
  pub locals: BTreeSet<String>,
  /// Root the branch's files are read from.
  #[serde(default)]
  pub path: Option<PathBuf>,
}

impl Branch {
  /// Create a branch with no dependencies, locals or explicit entry.
  pub fn new(id: BranchRef) -> Self {
    Self {
      id,
      main: None,
      dependencies: IndexMap::new(),
      locals: BTreeSet::new(),
      path: None,
    }
  }

  /// Builder-style helper setting the declared entry file.
  pub fn with_main(mut self, main: impl Into<String>) -> Self {
    self.main = Some(main.into());
    self
  }

  /// Builder-style helper registering a dependency alias.
  pub fn with_dependency(mut self, alias: impl Into<String>, target: BranchRef) -> Self {
    self.dependencies.insert(alias.into(), target);
    self
  }

  /// Builder-style helper declaring a local bare name.
  pub fn with_local(mut self, name: impl Into<String>) -> Self {
    self.locals.insert(name.into());
    self
  }

  /// Builder-style helper pinning the base path.
  pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
    self.path = Some(path.into());
    self
  }

  /// Canonical name of the branch.
  pub fn canonical_name(&self) -> String {
    self.id.canonical_name()
  }

  /// Root-relative entry path, defaulting to [`DEFAULT_MAIN`].
  pub fn entry_path(&self) -> String {
    strip_leading(self.main.as_deref().unwrap_or(DEFAULT_MAIN)).to_string()
  }

  /// Base path for this branch, falling back to its folder below `components_dir`.
  pub fn base_path(&self, components_dir: &Path) -> PathBuf {
    match &self.path {
      Some(path) => path.clone(),
      None => components_dir.join(self.id.folder()),
    }
  }
}

/// Strip a leading `./` and any leading separators from a branch-relative path.
pub fn strip_leading(path: &str) -> &str {
  let path = path.strip_prefix("./").unwrap_or(path);
  path.trim_start_matches('/')
}

/// Output category a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  /// Executable CommonJS sources.
  Scripts,
  /// JSON payloads exported as static values.
  Json,
  /// Text templates exported as strings.
  Templates,
  /// Stylesheets whose embedded URLs are rewritten.
  Styles,
}

impl Role {
  /// Roles concatenated into the script bundle, in output order.
  pub const SCRIPT_ROLES: [Self; 3] = [Self::Scripts, Self::Json, Self::Templates];
  /// Roles concatenated into the style bundle.
  pub const STYLE_ROLES: [Self; 1] = [Self::Styles];

  /// Whether files of this role are registered in the module registry.
  pub fn is_registered(self) -> bool {
    !matches!(self, Self::Styles)
  }

  /// Field name used in build descriptions.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Scripts => "scripts",
      Self::Json => "json",
      Self::Templates => "templates",
      Self::Styles => "styles",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Ordered relative file paths discovered for each role.
pub type RoleFiles = BTreeMap<Role, Vec<String>>;

/// One fully-formed branch plus its discovered files.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BranchInput {
  /// The branch itself.
  #[serde(flatten)]
  pub branch: Branch,
  /// Files per role, in discovery order.
  #[serde(default)]
  pub files: RoleFiles,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn canonical_name_includes_reference_for_remote_branches() {
    assert_eq!(
      BranchRef::remote("acme/widget", "1.2.0").canonical_name(),
      "acme/widget@1.2.0"
    );
    assert_eq!(BranchRef::local("boot").canonical_name(), "boot");
  }

  #[test]
  fn only_script_roles_are_registered() {
    assert!(Role::SCRIPT_ROLES.iter().all(|role| role.is_registered()));
    assert!(!Role::Styles.is_registered());
  }

  #[test]
  fn asset_segment_uses_owner_repo_form() {
    assert_eq!(BranchRef::local("acme/widget").asset_segment(), "acme-widget");
  }

  #[test]
  fn entry_path_defaults_and_strips_leading_markers() {
    let branch = Branch::new(BranchRef::local("boot"));
    assert_eq!(branch.entry_path(), "index.js");

    let branch = branch.with_main("./lib/index.js");
    assert_eq!(branch.entry_path(), "lib/index.js");

    let branch = Branch::new(BranchRef::local("boot")).with_main("/main.js");
    assert_eq!(branch.entry_path(), "main.js");
  }

  #[test]
  fn base_path_falls_back_to_components_folder() {
    let branch = Branch::new(BranchRef::remote("acme/widget", "1.0.0"));
    assert_eq!(
      branch.base_path(Path::new("components")),
      PathBuf::from("components").join("acme").join("widget").join("1.0.0")
    );

    let pinned = branch.with_path("/srv/widget");
    assert_eq!(
      pinned.base_path(Path::new("components")),
      PathBuf::from("/srv/widget")
    );
  }

  #[test]
  fn deserialises_branch_input_from_build_description() {
    let input: BranchInput = serde_json::from_str(
      r#"{
        "name": "acme/widget",
        "ref": "1.0.0",
        "main": "lib/index.js",
        "dependencies": { "acme/emitter": { "name": "acme/emitter", "ref": "0.3.1" } },
        "locals": ["boot"],
        "files": { "scripts": ["lib/index.js"], "styles": ["widget.css"] }
      }"#,
    )
    .expect("valid build description");

    assert_eq!(input.branch.canonical_name(), "acme/widget@1.0.0");
    assert_eq!(
      input.branch.dependencies["acme/emitter"].canonical_name(),
      "acme/emitter@0.3.1"
    );
    assert!(input.branch.locals.contains("boot"));
    assert_eq!(input.files[&Role::Scripts], vec!["lib/index.js".to_string()]);
    assert_eq!(input.files[&Role::Styles], vec!["widget.css".to_string()]);
  }
}
