use crate::areas::object_store::ObjectStore;
use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::snapshot::tree_builder::TreeBuilder;
use std::io::Write;

impl Repository {
    /// Store the working tree and print the root tree id.
    ///
    /// A workspace without any file yields the empty tree.
    pub async fn snapshot_tree(&self) -> anyhow::Result<ObjectId> {
        self.ensure_initialized()?;

        let tree_oid = match TreeBuilder::new(self.workspace(), self).build().await? {
            Some(tree_oid) => tree_oid,
            None => self.write_tree(Vec::new()).await?,
        };

        writeln!(self.writer(), "{tree_oid}")?;

        Ok(tree_oid)
    }
}
