use crate::areas::object_store::ObjectStore;
use crate::artifacts::branch::branch_name::SymRefName;
use crate::artifacts::objects::object::{Object, ObjectBox, frame};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::{Tree, TreeEntry};
use crate::errors::RefError;
use bytes::Bytes;
use std::cell::RefCell;
use std::collections::HashMap;

/// In-memory `ObjectStore` with switches to make single operations fail
pub struct MemoryStore {
    objects: RefCell<HashMap<ObjectId, Bytes>>,
    refs: RefCell<HashMap<SymRefName, ObjectId>>,
    head: SymRefName,
    last_change: RefCell<Option<i64>>,
    failing_blob: Option<Bytes>,
    fail_ref_update: bool,
    fail_last_change: bool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore {
            objects: RefCell::default(),
            refs: RefCell::default(),
            head: SymRefName::new("refs/heads/master".to_string()),
            last_change: RefCell::default(),
            failing_blob: None,
            fail_ref_update: false,
            fail_last_change: false,
        }
    }
}

impl MemoryStore {
    pub fn fail_blob(mut self, content: Bytes) -> Self {
        self.failing_blob = Some(content);
        self
    }

    pub fn fail_ref_update(mut self) -> Self {
        self.fail_ref_update = true;
        self
    }

    pub fn fail_last_change(mut self) -> Self {
        self.fail_last_change = true;
        self
    }

    pub fn head(&self) -> &SymRefName {
        &self.head
    }

    pub fn ref_value(&self) -> Option<ObjectId> {
        self.refs.borrow().get(&self.head).cloned()
    }

    pub fn set_ref_value(&self, oid: ObjectId) {
        self.refs.borrow_mut().insert(self.head.clone(), oid);
    }

    pub fn last_change(&self) -> Option<i64> {
        *self.last_change.borrow()
    }

    /// Store framed bytes under an arbitrary id, bypassing hashing.
    pub fn insert_raw(&self, oid: ObjectId, framed: Bytes) {
        self.objects.borrow_mut().insert(oid, framed);
    }

    pub fn contains(&self, oid: &ObjectId) -> bool {
        self.objects.borrow().contains_key(oid)
    }

    pub fn object_count(&self) -> usize {
        self.objects.borrow().len()
    }

    pub fn count_of(&self, kind: ObjectType) -> usize {
        let prefix = format!("{} ", kind.as_str());

        self.objects
            .borrow()
            .values()
            .filter(|framed| framed.starts_with(prefix.as_bytes()))
            .count()
    }

    pub fn object(&self, oid: &ObjectId) -> Option<ObjectBox> {
        let framed = self.objects.borrow().get(oid).cloned()?;

        ObjectBox::parse(framed).ok()
    }

    pub fn tree(&self, oid: &ObjectId) -> Option<Tree> {
        self.object(oid)?.into_tree()
    }

    fn insert(&self, framed: Bytes) -> ObjectId {
        let oid = ObjectId::hash(&framed);
        self.objects.borrow_mut().insert(oid.clone(), framed);

        oid
    }
}

impl ObjectStore for MemoryStore {
    async fn write_raw_object(
        &self,
        kind: ObjectType,
        content: Bytes,
    ) -> anyhow::Result<ObjectId> {
        if kind == ObjectType::Blob && self.failing_blob.as_ref() == Some(&content) {
            anyhow::bail!("simulated write failure");
        }
        tokio::task::yield_now().await;

        Ok(self.insert(frame(kind, &content)))
    }

    async fn write_tree(&self, entries: Vec<TreeEntry>) -> anyhow::Result<ObjectId> {
        let tree = Tree::new(entries)?;
        tokio::task::yield_now().await;

        Ok(self.insert(tree.serialize()?))
    }

    async fn retrieve_object(
        &self,
        oid: &ObjectId,
        kind: ObjectType,
    ) -> anyhow::Result<ObjectBox> {
        let framed = self
            .objects
            .borrow()
            .get(oid)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("object {oid} not found"))?;
        let object = ObjectBox::parse(framed)?;

        if object.object_type() != kind {
            anyhow::bail!("object {oid} is not a {kind}");
        }

        Ok(object)
    }

    async fn head_ref(&self) -> anyhow::Result<SymRefName> {
        Ok(self.head.clone())
    }

    async fn head_for_ref(&self, ref_name: &SymRefName) -> Result<ObjectId, RefError> {
        self.refs
            .borrow()
            .get(ref_name)
            .cloned()
            .ok_or_else(|| RefError::Unborn(ref_name.clone()))
    }

    async fn update_ref(&self, ref_name: &SymRefName, oid: &ObjectId) -> anyhow::Result<()> {
        if self.fail_ref_update {
            anyhow::bail!("simulated ref lock failure");
        }
        self.refs.borrow_mut().insert(ref_name.clone(), oid.clone());

        Ok(())
    }

    async fn update_last_change(&self, value: i64) -> anyhow::Result<()> {
        if self.fail_last_change {
            anyhow::bail!("simulated marker failure");
        }
        *self.last_change.borrow_mut() = Some(value);

        Ok(())
    }
}
