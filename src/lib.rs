#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod builder;
pub mod codegen;
pub mod config;
pub mod error;
pub mod files;
pub mod models;
pub mod plugins;
pub mod resolve;

pub use builder::Bundler;
pub use config::BundleOptions;
pub use error::{BundleError, Result};
pub use files::{ContentReader, FileRecord, FsReader, MemoryReader};
pub use models::{Branch, BranchInput, BranchRef, Role, RoleFiles};
pub use plugins::{Pipeline, Transform, TransformContext};
