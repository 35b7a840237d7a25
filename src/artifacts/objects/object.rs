use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use anyhow::Result;
use bytes::Bytes;
use std::io::{BufRead, Cursor};

pub trait Packable {
    /// Object payload, without the `<type> <size>\0` header.
    fn content(&self) -> Result<Bytes>;
}

pub trait Unpackable {
    /// Parse an object payload; the header has already been consumed.
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn display(&self) -> String;

    fn serialize(&self) -> Result<Bytes> {
        Ok(frame(self.object_type(), &self.content()?))
    }

    fn object_id(&self) -> Result<ObjectId> {
        Ok(ObjectId::hash(&self.serialize()?))
    }
}

/// Prefix a payload with its `<type> <size>\0` header.
pub fn frame(object_type: ObjectType, content: &[u8]) -> Bytes {
    let header = format!("{} {}\0", object_type.as_str(), content.len());

    let mut object_bytes = Vec::with_capacity(header.len() + content.len());
    object_bytes.extend_from_slice(header.as_bytes());
    object_bytes.extend_from_slice(content);

    Bytes::from(object_bytes)
}

#[derive(Debug)]
pub enum ObjectBox {
    Blob(Box<Blob>),
    Tree(Box<Tree>),
    Commit(Box<Commit>),
}

impl ObjectBox {
    /// Parse a framed object (`<type> <size>\0<content>`).
    pub fn parse(object_content: Bytes) -> Result<Self> {
        let mut object_reader = Cursor::new(object_content);
        let object_type = ObjectType::parse_object_type(&mut object_reader)?;

        Ok(match object_type {
            ObjectType::Blob => ObjectBox::Blob(Box::new(Blob::deserialize(object_reader)?)),
            ObjectType::Tree => ObjectBox::Tree(Box::new(Tree::deserialize(object_reader)?)),
            ObjectType::Commit => ObjectBox::Commit(Box::new(Commit::deserialize(object_reader)?)),
        })
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            ObjectBox::Blob(_) => ObjectType::Blob,
            ObjectBox::Tree(_) => ObjectType::Tree,
            ObjectBox::Commit(_) => ObjectType::Commit,
        }
    }

    pub fn display(&self) -> String {
        match self {
            ObjectBox::Blob(blob) => blob.display(),
            ObjectBox::Tree(tree) => tree.display(),
            ObjectBox::Commit(commit) => commit.display(),
        }
    }

    pub fn into_commit(self) -> Option<Commit> {
        match self {
            ObjectBox::Commit(commit) => Some(*commit),
            _ => None,
        }
    }

    pub fn into_tree(self) -> Option<Tree> {
        match self {
            ObjectBox::Tree(tree) => Some(*tree),
            _ => None,
        }
    }
}
