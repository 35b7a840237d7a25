use crate::artifacts::objects::object::{Object, ObjectBox, frame};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Loose object database (`.git/objects`)
#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

// TODO: implement packfiles for better performance and storage efficiency
impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub async fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        self.store_framed(object.serialize()?).await
    }

    /// Store a payload under the given type; the header is added here.
    pub async fn store_raw(&self, kind: ObjectType, content: &[u8]) -> anyhow::Result<ObjectId> {
        self.store_framed(frame(kind, content)).await
    }

    async fn store_framed(&self, object_content: Bytes) -> anyhow::Result<ObjectId> {
        let object_id = ObjectId::hash(&object_content);
        let object_path = self.path.join(object_id.to_path());

        // content addressed: an existing file already holds these bytes
        if tokio::fs::try_exists(&object_path).await? {
            log::trace!("object {object_id} already stored");
            return Ok(object_id);
        }

        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        tokio::fs::create_dir_all(object_dir).await.context(format!(
            "Unable to create object directory {}",
            object_dir.display()
        ))?;

        self.write_object(object_path, object_content).await?;
        log::trace!("stored object {object_id}");

        Ok(object_id)
    }

    /// Decompressed object bytes, header included.
    pub async fn load(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        let object_path = self.path.join(object_id.to_path());

        self.read_object(object_path).await
    }

    pub async fn parse_object(&self, object_id: &ObjectId) -> anyhow::Result<ObjectBox> {
        let object_content = self.load(object_id).await?;

        if ObjectId::hash(&object_content) != *object_id {
            anyhow::bail!("Object {object_id} does not match its content");
        }

        ObjectBox::parse(object_content)
            .with_context(|| format!("Unable to parse object {object_id}"))
    }

    async fn read_object(&self, object_path: PathBuf) -> anyhow::Result<Bytes> {
        let object_content = tokio::fs::read(&object_path).await.context(format!(
            "Unable to read object file {}",
            object_path.display()
        ))?;

        Self::decompress(object_content.into())
    }

    async fn write_object(&self, object_path: PathBuf, object_content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let object_content = Self::compress(object_content)?;

        tokio::fs::write(&temp_object_path, &object_content)
            .await
            .context(format!(
                "Unable to write object file {}",
                temp_object_path.display()
            ))?;

        // rename the temp file to the object file to make it atomic
        tokio::fs::rename(&temp_object_path, &object_path)
            .await
            .context(format!(
                "Unable to rename object file to {}",
                object_path.display()
            ))?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed_content| compressed_content.into())
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }

    /// Find all objects whose OID starts with the given prefix.
    ///
    /// Used to resolve abbreviated OIDs. More than one match means the
    /// prefix is ambiguous.
    pub async fn find_objects_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        let prefix = prefix.to_ascii_lowercase();
        if prefix.len() < 2 || !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            anyhow::bail!("Object name {prefix} is too short or not hexadecimal");
        }

        let (dir_name, file_prefix) = prefix.split_at(2);
        let dir_path = self.path.join(dir_name);
        let mut matches = Vec::new();

        if !tokio::fs::try_exists(&dir_path).await? {
            return Ok(matches);
        }

        let mut entries = tokio::fs::read_dir(&dir_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();

            if file_name.starts_with(file_prefix)
                && let Ok(oid) = ObjectId::try_parse(format!("{dir_name}{file_name}"))
            {
                matches.push(oid);
            }
        }

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use rstest::{fixture, rstest};

    #[fixture]
    fn objects_dir() -> TempDir {
        TempDir::new().expect("Failed to create temp dir")
    }

    #[rstest]
    #[tokio::test]
    async fn test_stored_blob_is_zlib_framed_under_its_id(objects_dir: TempDir) {
        let database = Database::new(objects_dir.path().into());

        let oid = database
            .store_raw(ObjectType::Blob, b"hello world\n")
            .await
            .unwrap();

        pretty_assertions::assert_eq!(oid.as_ref(), "3b18e512dba79e4c8300dd08aeb37f8e728b8dad");
        assert!(objects_dir.path().join(oid.to_path()).is_file());
        pretty_assertions::assert_eq!(
            database.load(&oid).await.unwrap(),
            Bytes::from_static(b"blob 12\0hello world\n")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_storing_twice_is_idempotent(objects_dir: TempDir) {
        let database = Database::new(objects_dir.path().into());

        let first = database.store_raw(ObjectType::Blob, b"same").await.unwrap();
        let second = database.store_raw(ObjectType::Blob, b"same").await.unwrap();

        pretty_assertions::assert_eq!(first, second);
        let files = std::fs::read_dir(objects_dir.path().join(&first.as_ref()[..2]))
            .unwrap()
            .count();
        pretty_assertions::assert_eq!(files, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_parse_object_detects_tampered_content(objects_dir: TempDir) {
        let database = Database::new(objects_dir.path().into());
        let oid = database.store_raw(ObjectType::Blob, b"original").await.unwrap();

        let tampered = Database::compress(frame(ObjectType::Blob, b"tampered")).unwrap();
        std::fs::write(objects_dir.path().join(oid.to_path()), tampered).unwrap();

        assert!(database.parse_object(&oid).await.is_err());
    }

    #[rstest]
    #[tokio::test]
    async fn test_find_objects_by_prefix(objects_dir: TempDir) {
        let database = Database::new(objects_dir.path().into());
        let oid = database
            .store_raw(ObjectType::Blob, b"hello world\n")
            .await
            .unwrap();

        let matches = database.find_objects_by_prefix("3b18e5").await.unwrap();
        pretty_assertions::assert_eq!(matches, vec![oid]);

        let matches = database.find_objects_by_prefix("ffff").await.unwrap();
        assert!(matches.is_empty());
    }
}
