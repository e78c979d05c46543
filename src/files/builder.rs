//! Convert a branch's discovered paths into addressable file records.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::files::record::{FileEntry, FileRecord};
use crate::models::{Branch, Role, RoleFiles};

/// Per-branch naming context shared by every file of the branch.
#[derive(Debug, Clone)]
pub struct BranchContext<'a> {
  /// The branch being bundled.
  pub branch: &'a Branch,
  /// Canonical name of the branch.
  pub name: String,
  /// Root-relative entry path.
  pub main: String,
  /// Directory part of `main`, including the trailing separator.
  pub prefix: String,
  /// Root the branch's files are read from.
  pub base_path: PathBuf,
  /// Every file of the branch, in role then discovery order.
  pub all: Vec<FileEntry>,
}

impl BranchContext<'_> {
  /// Registered name for a branch-relative path and its entry-relative form.
  fn name_for(&self, path: &str) -> (String, String) {
    let resolved = path.strip_prefix(self.prefix.as_str()).unwrap_or(path).to_string();
    let name = if path == self.main {
      self.name.clone()
    } else {
      format!("{}/{}", self.name, resolved)
    };
    (name, resolved)
  }
}

/// File records of one branch partitioned by role, plus the naming context.
#[derive(Debug)]
pub struct BranchFiles<'a> {
  /// Naming context and flattened lookup list.
  pub context: BranchContext<'a>,
  /// Records per role, in discovery order.
  pub records: BTreeMap<Role, Vec<FileRecord>>,
}

/// Build the records for `roles` of `branch` from the discovered `files`.
///
/// Roles missing from `files` yield empty lists. Content is not read here.
pub fn build_branch_files<'a>(
  branch: &'a Branch,
  base_path: PathBuf,
  roles: &[Role],
  files: &RoleFiles,
) -> BranchFiles<'a> {
  let main = branch.entry_path();
  let prefix = entry_prefix(&main).to_string();

  let mut context = BranchContext {
    branch,
    name: branch.canonical_name(),
    main,
    prefix,
    base_path,
    all: Vec::new(),
  };

  let mut records = BTreeMap::new();
  for &role in roles {
    let paths = files.get(&role).map(Vec::as_slice).unwrap_or_default();
    let role_records: Vec<FileRecord> = paths
      .iter()
      .map(|path| {
        let (canonical_name, resolved_path) = context.name_for(path);
        FileRecord::new(
          path.clone(),
          resolved_path,
          canonical_name,
          context.base_path.join(path),
          role,
        )
      })
      .collect();

    context
      .all
      .extend(role_records.iter().map(|record| FileEntry {
        path: record.path.clone(),
        canonical_name: record.canonical_name.clone(),
      }));
    records.insert(role, role_records);
  }

  BranchFiles { context, records }
}

/// Directory part of an entry path: `lib/index.js` -> `lib/`.
fn entry_prefix(main: &str) -> &str {
  match main.rfind('/') {
    Some(index) => &main[..=index],
    None => "",
  }
}
