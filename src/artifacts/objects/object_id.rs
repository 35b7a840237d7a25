//! Object ids
//!
//! An id is the SHA-1 digest of a framed object (`<type> <size>\0<content>`),
//! kept as 40 lowercase hex digits. Tree entries carry the raw 20 bytes instead.
//! Loose objects live at `objects/<2 hex digits>/<38 hex digits>`.

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use sha1::{Digest, Sha1};
use std::io;
use std::path::PathBuf;

/// Size of a digest in its binary form
const RAW_LENGTH: usize = OBJECT_ID_LENGTH / 2;

/// Length of the abbreviated form shown to users
const SHORT_LENGTH: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Accepts 40 hex digits in either case; the id is stored lowercase.
    pub fn try_parse(id: String) -> anyhow::Result<Self> {
        match id.len() == OBJECT_ID_LENGTH && id.bytes().all(|b| b.is_ascii_hexdigit()) {
            true => Ok(ObjectId(id.to_ascii_lowercase())),
            false => anyhow::bail!("{id:?} is not a valid object id"),
        }
    }

    pub fn hash(framed_object: &[u8]) -> Self {
        let mut raw = [0; RAW_LENGTH];
        raw.copy_from_slice(&Sha1::digest(framed_object));

        Self::from_raw(raw)
    }

    pub fn from_raw(raw: [u8; RAW_LENGTH]) -> Self {
        ObjectId(raw.iter().map(|byte| format!("{byte:02x}")).collect())
    }

    pub fn to_raw(&self) -> anyhow::Result<[u8; RAW_LENGTH]> {
        let mut raw = [0; RAW_LENGTH];
        for (byte, pair) in raw.iter_mut().zip(self.0.as_bytes().chunks(2)) {
            *byte = u8::from_str_radix(std::str::from_utf8(pair)?, 16)?;
        }

        Ok(raw)
    }

    /// Append the 20 raw bytes, as found in a tree entry.
    pub fn write_raw_to(&self, writer: &mut impl io::Write) -> anyhow::Result<()> {
        writer.write_all(&self.to_raw()?)?;

        Ok(())
    }

    pub fn read_raw_from(reader: &mut impl io::Read) -> anyhow::Result<Self> {
        let mut raw = [0; RAW_LENGTH];
        reader.read_exact(&mut raw)?;

        Ok(Self::from_raw(raw))
    }

    /// `objects/`-relative location of the loose object
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    pub fn to_short_oid(&self) -> String {
        self.0[..SHORT_LENGTH].to_string()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
