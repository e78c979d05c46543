//! The `require` runtime prepended to script bundles.

/// Module registry implementing `require`, `require.register` and `require.define`.
pub const REQUIRE_RUNTIME: &str = include_str!("require.js");

/// Runtime text followed by the blank-line separator used between modules.
pub fn preamble() -> String {
  format!("{REQUIRE_RUNTIME}\n\n")
}
