//! Git references (branches, HEAD)
//!
//! References are human-readable names pointing to commits. They can be:
//! - Direct: Containing a commit SHA-1
//! - Symbolic: Pointing to another reference (e.g., HEAD -> refs/heads/master)
//!
//! ## File Format
//!
//! References are stored as text files containing either:
//! - A 40-character SHA-1 hash followed by a newline (direct reference)
//! - `ref: <path>` for symbolic references
//!
//! A branch whose file is missing or empty is unborn: it exists by name
//! (usually because HEAD points at it) but has no commit yet.

use crate::artifacts::branch::branch_name::SymRefName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RefError;
use anyhow::Context;
use derive_new::new;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::{Path, PathBuf};

/// Git references manager
///
/// Handles reading and writing references (branches, HEAD).
/// Writers go through a `<ref>.lock` file that replaces the ref by rename.
#[derive(Debug, new)]
pub struct Refs {
    /// Path to the git directory (typically `.git`)
    path: Box<Path>,
}

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

/// Symbolic references chains longer than this are treated as a loop
const MAX_SYMREF_DEPTH: usize = 5;

#[derive(Debug, Clone)]
enum SymRefOrOid {
    SymRef { sym_ref_name: SymRefName },
    Oid(ObjectId),
}

impl SymRefOrOid {
    fn read_symref_or_oid(path: &Path) -> anyhow::Result<Option<SymRefOrOid>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read ref file at {:?}", path))?;
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        let symref_match = regex::Regex::new(SYMREF_REGEX)?.captures(content);
        if let Some(symref_match) = symref_match {
            Ok(Some(SymRefOrOid::SymRef {
                sym_ref_name: SymRefName::new(symref_match[1].to_string()),
            }))
        } else {
            Ok(Some(SymRefOrOid::Oid(ObjectId::try_parse(
                content.to_string(),
            )?)))
        }
    }
}

impl Refs {
    /// Follow symbolic references from `source` (HEAD by default) to the
    /// reference that actually stores a commit id.
    ///
    /// HEAD holding a commit id directly (detached) resolves to HEAD itself.
    pub fn current_ref(&self, source: Option<SymRefName>) -> anyhow::Result<SymRefName> {
        let mut current = source.unwrap_or_else(|| SymRefName::new(HEAD_REF_NAME.to_string()));

        for _ in 0..MAX_SYMREF_DEPTH {
            match SymRefOrOid::read_symref_or_oid(&self.ref_path(&current))? {
                Some(SymRefOrOid::SymRef { sym_ref_name }) => current = sym_ref_name,
                Some(SymRefOrOid::Oid(_)) | None => return Ok(current),
            }
        }

        anyhow::bail!("symbolic reference chain starting at {current} is too deep")
    }

    /// Commit id stored in a reference, following symbolic references.
    pub fn read_ref(&self, sym_ref_name: &SymRefName) -> Result<ObjectId, RefError> {
        let target = self.current_ref(Some(sym_ref_name.clone()))?;

        match SymRefOrOid::read_symref_or_oid(&self.ref_path(&target))? {
            Some(SymRefOrOid::Oid(oid)) => Ok(oid),
            Some(SymRefOrOid::SymRef { .. }) | None => Err(RefError::Unborn(target)),
        }
    }

    /// Point a (direct) reference at a commit.
    ///
    /// On failure the reference keeps its previous value.
    pub fn update_ref(&self, sym_ref_name: &SymRefName, oid: &ObjectId) -> anyhow::Result<()> {
        self.update_ref_file(&self.ref_path(sym_ref_name), format!("{oid}\n"))
    }

    pub fn set_head(&self, target: &SymRefName) -> anyhow::Result<()> {
        self.update_ref_file(&self.head_path(), format!("ref: {target}\n"))
    }

    /// Write `raw_ref` to `<path>.lock`, then rename it over the ref file.
    ///
    /// Readers see either the old or the new content. A leftover lock file
    /// from another writer makes the update fail without touching the ref.
    fn update_ref_file(&self, path: &Path, raw_ref: String) -> anyhow::Result<()> {
        std::fs::create_dir_all(path.parent().with_context(|| {
            format!(
                "failed to create parent directories for ref file at {:?}",
                path
            )
        })?)?;

        let lock_path = Self::lock_path(path);
        let mut lock_file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
            .with_context(|| format!("failed to create lock file at {:?}", lock_path))?;

        let result = Self::write_locked(&mut lock_file, &raw_ref)
            .and_then(|()| {
                std::fs::rename(&lock_path, path)
                    .with_context(|| format!("failed to move lock file onto {:?}", path))
            })
            .with_context(|| format!("failed to write ref file at {:?}", path));

        if result.is_err()
            && let Err(error) = std::fs::remove_file(&lock_path)
        {
            log::warn!("failed to remove lock file {:?}: {}", lock_path, error);
        }

        result
    }

    fn write_locked(lock_file: &mut std::fs::File, raw_ref: &str) -> anyhow::Result<()> {
        let mut lock = file_guard::lock(lock_file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(raw_ref.as_bytes())?;
        lock.sync_all()?;

        Ok(())
    }

    fn lock_path(path: &Path) -> PathBuf {
        let mut lock_path = path.as_os_str().to_owned();
        lock_path.push(".lock");

        PathBuf::from(lock_path)
    }

    fn ref_path(&self, sym_ref_name: &SymRefName) -> PathBuf {
        self.path.join(sym_ref_name.as_ref_path())
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn refs_path(&self) -> Box<Path> {
        self.path.join("refs").into_boxed_path()
    }

    pub fn heads_path(&self) -> Box<Path> {
        self.refs_path().join("heads").into_boxed_path()
    }
}
