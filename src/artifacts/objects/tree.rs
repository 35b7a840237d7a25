//! Git tree object
//!
//! Trees represent directory snapshots in Git. They contain entries for files (blobs)
//! and subdirectories (other trees), along with their names and modes.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<mode> <name>\0<20-byte-sha1>`
//!
//! ## Ordering
//!
//! Entries are sorted by name, except that directories compare as if their
//! name ended with `/`. Git relies on this order, so any other order yields
//! digests that git considers different trees.

use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use derive_new::new;
use std::borrow::Cow;
use std::collections::HashSet;
use std::io::{BufRead, Write};

/// One line of a tree object
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    /// Single path segment
    pub name: String,
    /// Blob or sub-tree this entry refers to
    pub oid: ObjectId,
    pub mode: EntryMode,
}

impl TreeEntry {
    pub fn is_blob(&self) -> bool {
        !self.mode.is_tree()
    }

    pub fn collation_key(&self) -> Cow<'_, str> {
        if self.mode.is_tree() {
            Cow::Owned(format!("{}/", self.name))
        } else {
            Cow::Borrowed(&self.name)
        }
    }
}

/// Git tree object representing a directory snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// Build a tree from unordered entries, sorting them into git order.
    pub fn new(mut entries: Vec<TreeEntry>) -> anyhow::Result<Self> {
        let mut names = HashSet::new();
        for entry in &entries {
            if entry.name.is_empty() || entry.name.contains(['/', '\0']) {
                anyhow::bail!("invalid tree entry name: {:?}", entry.name);
            }
            if !names.insert(entry.name.as_str()) {
                anyhow::bail!("duplicate tree entry: {}", entry.name);
            }
        }

        entries.sort_by(|left, right| left.collation_key().cmp(&right.collation_key()));

        Ok(Tree { entries })
    }

    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }
}

impl Packable for Tree {
    fn content(&self) -> anyhow::Result<Bytes> {
        let mut content_bytes = Vec::new();

        for entry in &self.entries {
            write!(content_bytes, "{} {}", entry.mode.as_str(), entry.name)?;
            content_bytes.push(0);
            entry.oid.write_raw_to(&mut content_bytes)?;
        }

        Ok(Bytes::from(content_bytes))
    }
}

impl Unpackable for Tree {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut entries = Vec::new();
        let mut reader = reader;

        // Reuse scratch buffers to reduce allocs
        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            let n = reader.read_until(b' ', &mut mode_bytes)?;
            if n == 0 {
                break;
            }
            if mode_bytes.pop() != Some(b' ') {
                return Err(anyhow::anyhow!("unexpected EOF in mode"));
            }
            let mode = EntryMode::from_octal_str(std::str::from_utf8(&mode_bytes)?)?;

            name_bytes.clear();
            reader.read_until(b'\0', &mut name_bytes)?;
            if name_bytes.pop() != Some(b'\0') {
                return Err(anyhow::anyhow!("unexpected EOF in name"));
            }
            let name = std::str::from_utf8(&name_bytes)?.to_owned();

            let oid =
                ObjectId::read_raw_from(&mut reader).context("unexpected EOF in object id")?;

            entries.push(TreeEntry::new(name, oid, mode));
        }

        // stored order is authoritative, re-sorting would hide corrupt trees
        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.entries
            .iter()
            .map(|entry| {
                let object_type = if entry.is_blob() {
                    ObjectType::Blob
                } else {
                    ObjectType::Tree
                };

                format!(
                    "{:06o} {} {}\t{}",
                    entry.mode.as_u32(),
                    object_type,
                    entry.oid,
                    entry.name
                )
            })
            .collect::<Vec<String>>()
            .join("\n")
    }
}
