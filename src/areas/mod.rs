//! Core repository components
//!
//! - `database`: Object database for storing blobs, trees, and commits
//! - `object_store`: The storage seam the commit logic is written against
//! - `refs`: Reference management (branches, HEAD)
//! - `repository`: The on-disk repository, an `ObjectStore` implementation
//! - `workspace`: Working directory file system operations

pub mod database;
pub mod object_store;
pub mod refs;
pub mod repository;
pub mod workspace;
