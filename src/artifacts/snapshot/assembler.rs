//! Commit assembly
//!
//! Ordering of the side effects:
//! 1. resolve HEAD and its current commit (absent on an unborn branch)
//! 2. write every blob and tree of the working tree
//! 3. compare the new root tree with the parent's, bail out if equal
//! 4. write the commit object
//! 5. move the branch to the new commit
//! 6. touch the last change marker
//!
//! A failure at step 5 or 6 leaves a complete, readable commit behind; the
//! error carries its digest so the caller can report it.

use crate::areas::object_store::ObjectStore;
use crate::areas::workspace::Workspace;
use crate::artifacts::branch::branch_name::SymRefName;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object::Packable;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::snapshot::tree_builder::TreeBuilder;
use crate::errors::{CommitError, RefError};
use chrono::{DateTime, FixedOffset};
use derive_new::new;

/// Inputs of a single commit
#[derive(new)]
pub struct CommitOptions<'s, S> {
    workspace: &'s Workspace,
    store: &'s S,
    author_name: String,
    author_email: String,
    message: String,
    /// Defaults to the current local time
    #[new(default)]
    timestamp: Option<DateTime<FixedOffset>>,
}

impl<S> CommitOptions<'_, S> {
    pub fn with_timestamp(mut self, timestamp: DateTime<FixedOffset>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

#[derive(Debug, Clone)]
pub struct CommitOutcome {
    pub oid: ObjectId,
    pub ref_name: SymRefName,
    pub commit: Commit,
}

impl CommitOutcome {
    pub fn is_root(&self) -> bool {
        self.commit.parent().is_none()
    }
}

/// Record the working tree as a new commit on the checked-out reference.
pub async fn record_commit<S: ObjectStore>(
    options: &CommitOptions<'_, S>,
) -> Result<CommitOutcome, CommitError> {
    let store = options.store;

    let ref_name = store.head_ref().await.map_err(CommitError::IoFailure)?;
    let parent = match store.head_for_ref(&ref_name).await {
        Ok(oid) => Some(oid),
        Err(RefError::Unborn(_)) => {
            log::debug!("{} is unborn, recording a root commit", ref_name);
            None
        }
        Err(RefError::Other(error)) => return Err(CommitError::IoFailure(error)),
    };

    let tree_oid = match TreeBuilder::new(options.workspace, store)
        .build()
        .await
        .map_err(CommitError::IoFailure)?
    {
        Some(tree_oid) => tree_oid,
        None => store
            .write_tree(Vec::new())
            .await
            .map_err(CommitError::IoFailure)?,
    };

    if let Some(parent) = &parent {
        ensure_changes(store, parent, &tree_oid).await?;
    }

    let timestamp = options
        .timestamp
        .unwrap_or_else(|| chrono::Local::now().fixed_offset());
    let author = Author::new_with_timestamp(
        options.author_name.clone(),
        options.author_email.clone(),
        timestamp,
    );
    let commit = Commit::new(parent, tree_oid, author, options.message.clone());

    let content = commit.content().map_err(CommitError::IoFailure)?;
    let oid = store
        .write_raw_object(ObjectType::Commit, content)
        .await
        .map_err(CommitError::IoFailure)?;

    store
        .update_ref(&ref_name, &oid)
        .await
        .map_err(|source| CommitError::RefUpdateFailure {
            oid: oid.clone(),
            ref_name: ref_name.clone(),
            source,
        })?;

    store
        .update_last_change(chrono::Utc::now().timestamp_millis())
        .await
        .map_err(|source| CommitError::LastChangeMarkerFailure {
            oid: oid.clone(),
            source,
        })?;

    log::info!("recorded commit {} on {}", oid, ref_name);

    Ok(CommitOutcome {
        oid,
        ref_name,
        commit,
    })
}

async fn ensure_changes<S: ObjectStore>(
    store: &S,
    parent: &ObjectId,
    tree_oid: &ObjectId,
) -> Result<(), CommitError> {
    let parent_commit = store
        .retrieve_object(parent, ObjectType::Commit)
        .await
        .and_then(|object| {
            object
                .into_commit()
                .ok_or_else(|| anyhow::anyhow!("object {parent} is not a commit"))
        })
        .map_err(|source| CommitError::ObjectStoreCorrupted {
            oid: parent.clone(),
            source,
        })?;

    if parent_commit.tree_oid() == tree_oid {
        return Err(CommitError::NoChangesToCommit);
    }

    Ok(())
}
