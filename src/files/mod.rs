//! File record construction for a single branch.
//!
//! Records are built eagerly but their content is only read when a pipeline stage or the
//! code generator asks for it.

mod builder;
mod record;

pub use builder::{BranchContext, BranchFiles, build_branch_files};
pub use record::{ContentReader, Contents, FileEntry, FileRecord, FsReader, MemoryReader};
