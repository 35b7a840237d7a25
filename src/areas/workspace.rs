use crate::artifacts::objects::entry_mode::FileMode;
use anyhow::Context;
use bytes::Bytes;
use derive_new::new;
use is_executable::IsExecutable;
use std::path::{Path, PathBuf};

/// Reserved control directory, skipped at the workspace root
pub const GIT_DIR_NAME: &str = ".git";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceEntryKind {
    File(FileMode),
    Symlink,
    Directory,
}

/// A child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct WorkspaceEntry {
    pub name: String,
    /// Path relative to the workspace root
    pub path: PathBuf,
    pub kind: WorkspaceEntryKind,
}

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    /// List the direct children of a directory given relative to the root.
    ///
    /// Entries that are neither files, directories nor symlinks are skipped.
    pub async fn list_dir(&self, dir_path: &Path) -> anyhow::Result<Vec<WorkspaceEntry>> {
        let absolute_path = self.path.join(dir_path);
        let mut entries = tokio::fs::read_dir(&absolute_path)
            .await
            .with_context(|| format!("Failed to list directory {:?}", absolute_path))?;

        let mut children = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().into_string().map_err(|name| {
                anyhow::anyhow!("File name {:?} in {:?} is not valid UTF-8", name, dir_path)
            })?;

            if Self::is_ignored(dir_path, &name) {
                continue;
            }

            let file_type = entry
                .file_type()
                .await
                .with_context(|| format!("Failed to stat {:?}", entry.path()))?;
            let kind = if file_type.is_symlink() {
                WorkspaceEntryKind::Symlink
            } else if file_type.is_dir() {
                WorkspaceEntryKind::Directory
            } else if file_type.is_file() {
                match entry.path().is_executable() {
                    true => WorkspaceEntryKind::File(FileMode::Executable),
                    false => WorkspaceEntryKind::File(FileMode::Regular),
                }
            } else {
                log::warn!("skipping special file {:?}", entry.path());
                continue;
            };

            children.push(WorkspaceEntry::new(name.clone(), dir_path.join(name), kind));
        }

        Ok(children)
    }

    fn is_ignored(dir_path: &Path, name: &str) -> bool {
        dir_path.as_os_str().is_empty() && name == GIT_DIR_NAME
    }

    pub async fn read_file(&self, file_path: &Path) -> anyhow::Result<Bytes> {
        let file_path = self.path.join(file_path);

        let content = tokio::fs::read(&file_path)
            .await
            .with_context(|| format!("Failed to read file {:?}", file_path))?;

        Ok(content.into())
    }

    /// Target of a symbolic link, as stored in a git blob.
    pub async fn read_link(&self, link_path: &Path) -> anyhow::Result<Bytes> {
        let link_path = self.path.join(link_path);

        let target = tokio::fs::read_link(&link_path)
            .await
            .with_context(|| format!("Failed to read link {:?}", link_path))?;
        let target = target
            .into_os_string()
            .into_string()
            .map_err(|target| anyhow::anyhow!("Link target {:?} is not valid UTF-8", target))?;

        Ok(target.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::{FileWriteStr, PathChild, PathCreateDir};

    #[tokio::test]
    async fn test_list_dir_skips_git_dir_only_at_root() {
        let dir = TempDir::new().unwrap();
        dir.child(".git").create_dir_all().unwrap();
        dir.child("a.txt").write_str("a").unwrap();
        dir.child("nested").create_dir_all().unwrap();
        dir.child("nested/.git").write_str("gitdir: elsewhere").unwrap();
        let workspace = Workspace::new(dir.path().into());

        let mut root = workspace.list_dir(Path::new("")).await.unwrap();
        root.sort_by(|a, b| a.name.cmp(&b.name));
        let nested = workspace.list_dir(Path::new("nested")).await.unwrap();

        pretty_assertions::assert_eq!(
            root,
            vec![
                WorkspaceEntry::new(
                    "a.txt".to_string(),
                    PathBuf::from("a.txt"),
                    WorkspaceEntryKind::File(FileMode::Regular)
                ),
                WorkspaceEntry::new(
                    "nested".to_string(),
                    PathBuf::from("nested"),
                    WorkspaceEntryKind::Directory
                ),
            ]
        );
        pretty_assertions::assert_eq!(nested.len(), 1);
        pretty_assertions::assert_eq!(nested[0].path, PathBuf::from("nested/.git"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_dir_detects_executables_and_symlinks() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        dir.child("run.sh").write_str("#!/bin/sh").unwrap();
        std::fs::set_permissions(
            dir.child("run.sh").path(),
            std::fs::Permissions::from_mode(0o755),
        )
        .unwrap();
        std::os::unix::fs::symlink("run.sh", dir.child("link").path()).unwrap();
        let workspace = Workspace::new(dir.path().into());

        let mut entries = workspace.list_dir(Path::new("")).await.unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        pretty_assertions::assert_eq!(entries[0].kind, WorkspaceEntryKind::Symlink);
        pretty_assertions::assert_eq!(
            entries[1].kind,
            WorkspaceEntryKind::File(FileMode::Executable)
        );
        pretty_assertions::assert_eq!(
            workspace.read_link(Path::new("link")).await.unwrap(),
            Bytes::from_static(b"run.sh")
        );
    }
}
