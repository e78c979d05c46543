//! Code generation for the script bundle.
//!
//! Sources are linked by rewriting their `require` calls to registered names, then wrapped in
//! `require.register` (or `require.define` for static values). The runtime that interprets
//! those calls lives in [`runtime`].

pub mod runtime;
mod scanner;
mod wrap;

pub use runtime::{REQUIRE_RUNTIME, preamble};
pub use scanner::{Reference, rewrite_references, scan_references};
pub use wrap::{define, finalize, link, register};
