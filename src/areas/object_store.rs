//! Storage seam of the commit workflow
//!
//! The tree builder and the commit assembler only talk to storage through
//! this trait. Every operation is a suspension point; implementations must
//! make objects readable as soon as the write returns.

use crate::artifacts::branch::branch_name::SymRefName;
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::TreeEntry;
use crate::errors::RefError;
use bytes::Bytes;

#[allow(async_fn_in_trait)]
pub trait ObjectStore {
    /// Store a blob or commit payload (without header) and return its digest.
    async fn write_raw_object(&self, kind: ObjectType, content: Bytes)
    -> anyhow::Result<ObjectId>;

    /// Serialize the entries as a tree object (in git order) and store it.
    async fn write_tree(&self, entries: Vec<TreeEntry>) -> anyhow::Result<ObjectId>;

    /// Load an object, failing if it is missing, corrupt or not of `kind`.
    async fn retrieve_object(&self, oid: &ObjectId, kind: ObjectType)
    -> anyhow::Result<ObjectBox>;

    /// Name of the checked-out reference.
    async fn head_ref(&self) -> anyhow::Result<SymRefName>;

    /// Commit the reference points to, `RefError::Unborn` if it has none yet.
    async fn head_for_ref(&self, ref_name: &SymRefName) -> Result<ObjectId, RefError>;

    async fn update_ref(&self, ref_name: &SymRefName, oid: &ObjectId) -> anyhow::Result<()>;

    /// Coarse "something changed" marker for external observers.
    async fn update_last_change(&self, value: i64) -> anyhow::Result<()>;
}
