use crate::artifacts::branch::branch_name::SymRefName;
use crate::artifacts::objects::object_id::ObjectId;

/// Outcome of looking up the commit a reference points to.
#[derive(thiserror::Error, Debug)]
pub enum RefError {
    /// The reference exists (or is implied by HEAD) but holds no commit yet.
    #[error("branch {0} does not have any commits yet")]
    Unborn(SymRefName),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Every way a commit can fail.
///
/// `NoChangesToCommit` is an expected outcome rather than a fault, callers
/// should report it to the user instead of treating it as an error.
#[derive(thiserror::Error, Debug)]
pub enum CommitError {
    #[error("nothing to commit, working tree clean")]
    NoChangesToCommit,
    #[error("object store is corrupted: parent commit {oid} cannot be read")]
    ObjectStoreCorrupted {
        oid: ObjectId,
        #[source]
        source: anyhow::Error,
    },
    #[error("failed to record the working tree")]
    IoFailure(#[source] anyhow::Error),
    #[error("commit {oid} was written but {ref_name} could not be updated")]
    RefUpdateFailure {
        oid: ObjectId,
        ref_name: SymRefName,
        #[source]
        source: anyhow::Error,
    },
    #[error("commit {oid} was recorded but the last change marker could not be updated")]
    LastChangeMarkerFailure {
        oid: ObjectId,
        #[source]
        source: anyhow::Error,
    },
}

impl CommitError {
    /// Whether the error leaves the repository in a consistent state that
    /// only needs reporting.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CommitError::NoChangesToCommit
                | CommitError::RefUpdateFailure { .. }
                | CommitError::LastChangeMarkerFailure { .. }
        )
    }
}
