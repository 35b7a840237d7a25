use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use anyhow::Context;
use std::io::Write;

const DEFAULT_BRANCH: &str = "master";

impl Repository {
    pub async fn init(&self, initial_branch: Option<&str>) -> anyhow::Result<()> {
        let branch = BranchName::try_parse(initial_branch.unwrap_or(DEFAULT_BRANCH).to_string())?;

        tokio::fs::create_dir_all(self.database().objects_path())
            .await
            .context("Failed to create .git/objects directory")?;

        tokio::fs::create_dir_all(self.refs().heads_path())
            .await
            .context("Failed to create .git/refs/heads directory")?;

        // re-running init must not move HEAD off an existing branch
        if !self.refs().head_path().exists() {
            self.refs()
                .set_head(&branch.to_sym_ref_name())
                .context("Failed to create initial HEAD reference")?;
        }

        log::debug!("initialized repository at {:?} on {}", self.path(), branch);

        writeln!(
            self.writer(),
            "Initialized empty Git repository in {}",
            self.git_path().display()
        )?;

        Ok(())
    }
}
