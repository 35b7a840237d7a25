use crate::areas::repository::Repository;
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use std::io::Write;

impl Repository {
    pub async fn cat_file(&self, object_id: &str) -> anyhow::Result<()> {
        let object_id = self.resolve_object_id(object_id).await?;
        let object = self.database().parse_object(&object_id).await?;

        let output = object.display();
        match object {
            ObjectBox::Tree(_) if !output.is_empty() => writeln!(self.writer(), "{output}")?,
            _ => write!(self.writer(), "{output}")?,
        }

        Ok(())
    }

    async fn resolve_object_id(&self, object_id: &str) -> anyhow::Result<ObjectId> {
        if object_id.len() == OBJECT_ID_LENGTH {
            return ObjectId::try_parse(object_id.to_string());
        }

        let mut candidates = self.database().find_objects_by_prefix(object_id).await?;
        match candidates.len() {
            0 => anyhow::bail!("Not a valid object name {object_id}"),
            1 => Ok(candidates.remove(0)),
            _ => anyhow::bail!("short object ID {object_id} is ambiguous"),
        }
    }
}
