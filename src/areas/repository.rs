use crate::areas::database::Database;
use crate::areas::object_store::ObjectStore;
use crate::areas::refs::Refs;
use crate::areas::workspace::{GIT_DIR_NAME, Workspace};
use crate::artifacts::branch::branch_name::SymRefName;
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::{Tree, TreeEntry};
use crate::errors::RefError;
use anyhow::Context;
use bytes::Bytes;
use std::cell::{RefCell, RefMut};
use std::path::Path;

const LAST_CHANGE_FILE: &str = "last_change";

/// A repository on disk: the workspace plus its `.git` directory
pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    pub fn new(path: &str, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let path = Path::new(path);

        if !path.exists() {
            std::fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory {:?}", path))?;
        }
        let path = path.canonicalize()?;

        let git_path = path.join(GIT_DIR_NAME);
        let database = Database::new(git_path.join("objects").into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());
        let refs = Refs::new(git_path.into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            database,
            workspace,
            refs,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn git_path(&self) -> Box<Path> {
        self.path.join(GIT_DIR_NAME).into_boxed_path()
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    /// Fail early with a readable message when `.git` is missing.
    pub fn ensure_initialized(&self) -> anyhow::Result<()> {
        if !self.refs.head_path().exists() {
            anyhow::bail!(
                "not a git repository: {} (run `init` first)",
                self.path.display()
            );
        }

        Ok(())
    }
}

impl ObjectStore for Repository {
    async fn write_raw_object(
        &self,
        kind: ObjectType,
        content: Bytes,
    ) -> anyhow::Result<ObjectId> {
        self.database.store_raw(kind, &content).await
    }

    async fn write_tree(&self, entries: Vec<TreeEntry>) -> anyhow::Result<ObjectId> {
        let tree = Tree::new(entries)?;

        self.database.store(&tree).await
    }

    async fn retrieve_object(
        &self,
        oid: &ObjectId,
        kind: ObjectType,
    ) -> anyhow::Result<ObjectBox> {
        let object = self.database.parse_object(oid).await?;

        if object.object_type() != kind {
            anyhow::bail!(
                "object {} is a {}, expected a {}",
                oid,
                object.object_type(),
                kind
            );
        }

        Ok(object)
    }

    async fn head_ref(&self) -> anyhow::Result<SymRefName> {
        self.ensure_initialized()?;

        self.refs.current_ref(None)
    }

    async fn head_for_ref(&self, ref_name: &SymRefName) -> Result<ObjectId, RefError> {
        self.refs.read_ref(ref_name)
    }

    async fn update_ref(&self, ref_name: &SymRefName, oid: &ObjectId) -> anyhow::Result<()> {
        self.refs.update_ref(ref_name, oid)
    }

    async fn update_last_change(&self, value: i64) -> anyhow::Result<()> {
        let marker_path = self.git_path().join(LAST_CHANGE_FILE);

        tokio::fs::write(&marker_path, format!("{value}\n"))
            .await
            .with_context(|| format!("Failed to write {:?}", marker_path))
    }
}
