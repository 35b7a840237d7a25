use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Author;
use crate::artifacts::snapshot::assembler::{CommitOptions, CommitOutcome, record_commit};
use crate::errors::CommitError;
use std::io::Write;

impl Repository {
    /// Commit the working tree with the identity found in `GIT_AUTHOR_*`.
    ///
    /// Failures are returned as `CommitError` wrapped in `anyhow`, so callers
    /// can downcast to tell "nothing to commit" apart from real errors.
    pub async fn commit(&self, message: &str) -> anyhow::Result<CommitOutcome> {
        let author = Author::load_from_env()?;
        let message = message.trim().to_string();
        if message.is_empty() {
            anyhow::bail!("Aborting commit due to empty commit message");
        }

        let options = CommitOptions::new(
            self.workspace(),
            self,
            author.name().to_string(),
            author.email().to_string(),
            message,
        )
        .with_timestamp(author.timestamp());

        let outcome = record_commit(&options).await.inspect_err(|error| {
            if let CommitError::RefUpdateFailure { oid, ref_name, .. } = error {
                log::warn!("commit {} is not reachable from {}", oid, ref_name);
            }
        })?;

        let root_marker = if outcome.is_root() { " (root-commit)" } else { "" };
        writeln!(
            self.writer(),
            "[{}{} {}] {}",
            outcome.ref_name.short_name(),
            root_marker,
            outcome.oid.to_short_oid(),
            outcome.commit.short_message()
        )?;

        Ok(outcome)
    }
}
