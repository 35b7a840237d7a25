//! Commit objects
//!
//! ```text
//! tree <tree-oid>
//! parent <parent-oid>            (absent on the first commit, repeated on merges)
//! author <name> <<email>> <unix-seconds> <±HHMM>
//! committer <name> <<email>> <unix-seconds> <±HHMM>
//!
//! <message>
//! ```
//!
//! Every line, the last message line included, ends with a single `\n`.
//! Only the first parent is followed; further ones are kept verbatim.

use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use std::io::{BufRead, Read};
use std::str::FromStr;

/// Accepted `GIT_AUTHOR_DATE` layout besides RFC 2822
const AUTHOR_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Identity line of a commit, used for both author and committer
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: DateTime<FixedOffset>,
}

impl Author {
    pub fn new_with_timestamp(
        name: String,
        email: String,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    /// `Name <email> <seconds> <±HHMM>`, sub-second precision dropped.
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    pub fn parse_date(date: &str) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc2822(date)
            .or_else(|_| DateTime::parse_from_str(date, AUTHOR_DATE_FORMAT))
            .ok()
    }

    /// Identity from `GIT_AUTHOR_NAME` and `GIT_AUTHOR_EMAIL`, dated by
    /// `GIT_AUTHOR_DATE` when it parses, by the local clock otherwise.
    pub fn load_from_env() -> anyhow::Result<Self> {
        let name = std::env::var("GIT_AUTHOR_NAME").context("GIT_AUTHOR_NAME not set")?;
        let email = std::env::var("GIT_AUTHOR_EMAIL").context("GIT_AUTHOR_EMAIL not set")?;

        let timestamp = match std::env::var("GIT_AUTHOR_DATE") {
            Ok(date) => Self::parse_date(&date).unwrap_or_else(|| {
                log::warn!("ignoring unparsable GIT_AUTHOR_DATE {:?}", date);
                chrono::Local::now().fixed_offset()
            }),
            Err(_) => chrono::Local::now().fixed_offset(),
        };

        Ok(Author::new_with_timestamp(name, email, timestamp))
    }
}

impl FromStr for Author {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> anyhow::Result<Self> {
        let (name, rest) = line
            .split_once(" <")
            .with_context(|| format!("identity {line:?} has no email"))?;
        let (email, date) = rest
            .split_once("> ")
            .with_context(|| format!("identity {line:?} has an unterminated email"))?;
        let (seconds, offset) = date
            .split_once(' ')
            .with_context(|| format!("identity {line:?} has no timezone"))?;

        let seconds = seconds
            .parse::<i64>()
            .with_context(|| format!("invalid timestamp {seconds:?}"))?;
        let offset = DateTime::parse_from_str(
            &format!("1970-01-01 00:00:00 {offset}"),
            AUTHOR_DATE_FORMAT,
        )
        .with_context(|| format!("invalid timezone {offset:?}"))?
            .offset()
            .to_owned();
        let timestamp = DateTime::from_timestamp(seconds, 0)
            .with_context(|| format!("timestamp {seconds} out of range"))?
            .with_timezone(&offset);

        Ok(Author::new_with_timestamp(
            name.to_string(),
            email.to_string(),
            timestamp,
        ))
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Empty on the first commit of a branch
    parents: Vec<ObjectId>,
    tree_oid: ObjectId,
    author: Author,
    committer: Author,
    message: String,
}

impl Commit {
    /// The author doubles as committer. Trailing newlines of the message
    /// are dropped, the serialized form adds exactly one back.
    pub fn new(
        parent: Option<ObjectId>,
        tree_oid: ObjectId,
        author: Author,
        message: String,
    ) -> Self {
        Commit {
            parents: parent.into_iter().collect(),
            tree_oid,
            committer: author.clone(),
            author,
            message: message.trim_end_matches('\n').to_string(),
        }
    }

    /// Subject line
    pub fn short_message(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    /// First parent
    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    /// Commit payload exactly as hashed, without the object header.
    pub fn to_text(&self) -> String {
        let parent_lines = self
            .parents
            .iter()
            .map(|parent| format!("parent {parent}\n"))
            .collect::<String>();

        format!(
            "tree {}\n{parent_lines}author {}\ncommitter {}\n\n{}\n",
            self.tree_oid,
            self.author.display(),
            self.committer.display(),
            self.message
        )
    }
}

impl Packable for Commit {
    fn content(&self) -> anyhow::Result<Bytes> {
        Ok(Bytes::from(self.to_text()))
    }
}

impl Unpackable for Commit {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;

        let (headers, message) = text
            .split_once("\n\n")
            .context("commit has no message separator")?;

        let mut tree_oid = None;
        let mut parents = Vec::new();
        let mut author = None;
        let mut committer = None;
        for header in headers.lines() {
            let (key, value) = header
                .split_once(' ')
                .with_context(|| format!("malformed commit header {header:?}"))?;

            match key {
                "tree" => tree_oid = Some(ObjectId::try_parse(value.to_string())?),
                "parent" => parents.push(ObjectId::try_parse(value.to_string())?),
                "author" => author = Some(value.parse::<Author>()?),
                "committer" => committer = Some(value.parse::<Author>()?),
                _ => log::debug!("skipping commit header {key}"),
            }
        }

        Ok(Commit {
            parents,
            tree_oid: tree_oid.context("commit has no tree")?,
            author: author.context("commit has no author")?,
            committer: committer.context("commit has no committer")?,
            message: message.strip_suffix('\n').unwrap_or(message).to_string(),
        })
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        self.to_text()
    }
}
