//! Command implementations
//!
//! - `plumbing`: low-level commands working on objects directly (cat-file, write-tree)
//! - `porcelain`: user-facing commands (init, commit)
//!
//! Commands are `impl Repository` blocks and write their output to the
//! repository writer.

pub mod plumbing;
pub mod porcelain;
