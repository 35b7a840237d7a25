//! Plumbing commands
//!
//! - `cat-file`: pretty-print a stored object, addressed by a full or abbreviated id
//! - `write-tree`: snapshot the working tree without committing

pub mod cat_file;
pub mod write_tree;
