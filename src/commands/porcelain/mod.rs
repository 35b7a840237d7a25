//! Porcelain commands
//!
//! - `init`: create an empty repository
//! - `commit`: record the working tree on the checked-out branch

pub mod commit;
pub mod init;
