//! Recording the working tree as a commit
//!
//! - `tree_builder`: walks the workspace bottom-up and writes blob and tree objects
//! - `assembler`: runs the tree builder, rejects no-op commits, writes the
//!   commit object and advances the branch
//!
//! Both are written against `ObjectStore`, never against the disk layout.

pub mod assembler;
pub mod tree_builder;

#[cfg(test)]
pub(crate) mod memory_store;
