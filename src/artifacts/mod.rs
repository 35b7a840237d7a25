//! Git data structures and algorithms
//!
//! - `branch`: Reference names
//! - `objects`: Git object types (blob, tree, commit)
//! - `snapshot`: Working tree to tree objects, and tree to commit

pub mod branch;
pub mod objects;
pub mod snapshot;
