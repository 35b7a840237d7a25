//! A small embedded git client
//!
//! The crate snapshots a working directory into a git-compatible loose object
//! store and records the snapshot as a commit on the current branch.
//!
//! - `areas`: the repository on disk (object database, refs, workspace) and the
//!   `ObjectStore` seam the commit logic is written against
//! - `artifacts`: git objects and the snapshot (tree building + commit) logic
//! - `commands`: CLI-facing plumbing and porcelain commands
//! - `errors`: the typed failure taxonomy of a commit

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;
