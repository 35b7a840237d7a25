use crate::areas::object_store::ObjectStore;
use crate::areas::workspace::{Workspace, WorkspaceEntry, WorkspaceEntryKind};
use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::TreeEntry;
use anyhow::Context;
use derive_new::new;
use futures::FutureExt;
use futures::future::{LocalBoxFuture, try_join_all};
use std::path::{Path, PathBuf};

/// Builds the tree object of a workspace directory, recursively.
///
/// Siblings are hashed and stored concurrently; a directory's own tree is
/// written only once every child has been stored. Directories without any
/// file underneath produce no tree and are left out of their parent.
#[derive(new)]
pub struct TreeBuilder<'a, S> {
    workspace: &'a Workspace,
    store: &'a S,
}

impl<S: ObjectStore> TreeBuilder<'_, S> {
    /// Digest of the workspace root tree, `None` if there is nothing to record.
    pub async fn build(&self) -> anyhow::Result<Option<ObjectId>> {
        self.build_dir(PathBuf::new()).await
    }

    fn build_dir(&self, dir_path: PathBuf) -> LocalBoxFuture<'_, anyhow::Result<Option<ObjectId>>> {
        async move {
            let children = self.workspace.list_dir(&dir_path).await?;

            let entries = try_join_all(children.into_iter().map(|child| self.build_entry(child)))
                .await?
                .into_iter()
                .flatten()
                .collect::<Vec<_>>();

            if entries.is_empty() {
                log::debug!("skipping empty directory {:?}", dir_path);
                return Ok(None);
            }

            let tree_oid = self
                .store
                .write_tree(entries)
                .await
                .with_context(|| format!("Failed to store tree for {:?}", dir_path))?;
            log::trace!("stored tree {} for {:?}", tree_oid, dir_path);

            Ok(Some(tree_oid))
        }
        .boxed_local()
    }

    async fn build_entry(&self, child: WorkspaceEntry) -> anyhow::Result<Option<TreeEntry>> {
        match child.kind {
            WorkspaceEntryKind::File(file_mode) => {
                let content = self.workspace.read_file(&child.path).await?;
                let oid = self.store_blob(&child.path, content).await?;

                Ok(Some(TreeEntry::new(child.name, oid, file_mode.into())))
            }
            WorkspaceEntryKind::Symlink => {
                let target = self.workspace.read_link(&child.path).await?;
                let oid = self.store_blob(&child.path, target).await?;

                Ok(Some(TreeEntry::new(child.name, oid, EntryMode::Symlink)))
            }
            WorkspaceEntryKind::Directory => Ok(self
                .build_dir(child.path)
                .await?
                .map(|oid| TreeEntry::new(child.name, oid, EntryMode::Directory))),
        }
    }

    async fn store_blob(&self, path: &Path, content: bytes::Bytes) -> anyhow::Result<ObjectId> {
        self.store
            .write_raw_object(ObjectType::Blob, content)
            .await
            .with_context(|| format!("Failed to store blob for {:?}", path))
    }
}
