//! Transform pipeline run over every file before it is finalized.
//!
//! Stages decide whether a file contributes to the bundle (see
//! [`Contents`](crate::files::Contents)) and may replace its text. The stock stages cover
//! plain scripts, JSON, string templates and stylesheet URL rewriting; callers can assemble
//! their own [`Pipeline`] from any [`Transform`].

mod css;
mod scripts;

pub use css::{UrlRewrite, rewrite_urls};
pub use scripts::{IncludeJs, JsonValue, StringValue};

use std::fmt;

use crate::config::BundleOptions;
use crate::files::{BranchContext, ContentReader, FileRecord};
use crate::models::Role;

/// Read-only state available to a stage.
pub struct TransformContext<'a, 'b> {
  /// Active bundle options.
  pub options: &'a BundleOptions,
  /// Naming context of the branch owning the file.
  pub branch: &'a BranchContext<'b>,
  /// Lazy content accessor for the file.
  pub reader: &'a dyn ContentReader,
}

/// One stage of a pipeline.
pub trait Transform {
  /// Inspect and possibly update `file`.
  fn transform(&self, context: &TransformContext<'_, '_>, file: &mut FileRecord) -> anyhow::Result<()>;
}

/// Ordered list of stages applied to every file of a role.
#[derive(Default)]
pub struct Pipeline {
  stages: Vec<Box<dyn Transform>>,
}

impl Pipeline {
  /// Pipeline without stages; every file is left unused.
  pub fn new() -> Self {
    Self::default()
  }

  /// Append `stage`, returning the pipeline for chaining.
  pub fn with(mut self, stage: impl Transform + 'static) -> Self {
    self.stages.push(Box::new(stage));
    self
  }

  /// Stock pipeline for `role`.
  pub fn for_role(role: Role) -> Self {
    match role {
      Role::Scripts => Self::new().with(IncludeJs),
      Role::Json => Self::new().with(JsonValue),
      Role::Templates => Self::new().with(StringValue),
      Role::Styles => Self::new().with(UrlRewrite),
    }
  }

  /// Run every stage over `file`, stopping at the first failure.
  pub fn run(&self, context: &TransformContext<'_, '_>, file: &mut FileRecord) -> anyhow::Result<()> {
    for stage in &self.stages {
      stage.transform(context, file)?;
    }
    Ok(())
  }

  /// Number of stages.
  pub fn len(&self) -> usize {
    self.stages.len()
  }

  /// Whether the pipeline has no stages.
  pub fn is_empty(&self) -> bool {
    self.stages.is_empty()
  }
}

impl fmt::Debug for Pipeline {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Pipeline")
      .field("stages", &self.stages.len())
      .finish()
  }
}
