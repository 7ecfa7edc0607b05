use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use tracing::{debug, info};
use uuid::Uuid;

use super::{fmt_ts, parse_id, parse_ts, IdeaStore};
use crate::entity::{Attachment, StoredFile};
use crate::error::{IdeaboxError, Result};

impl IdeaStore {
    /// Store a blob. Rejects payloads over the configured size limit.
    pub fn put_file(&self, file: &StoredFile) -> Result<()> {
        let max = self.config().max_file_size;
        if file.len() > max {
            return Err(IdeaboxError::FileTooLarge {
                actual: file.len(),
                max,
            });
        }
        self.conn.execute(
            "INSERT INTO stored_files (id, blob, metadata, accessed_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                file.id.to_string(),
                file.blob,
                serde_json::to_string(&file.metadata)?,
                file.accessed_at.as_ref().map(fmt_ts),
                fmt_ts(&file.created_at),
                fmt_ts(&file.updated_at),
            ],
        )?;
        debug!(file = %file.id, bytes = file.len(), "stored file");
        Ok(())
    }

    /// Read a blob back, recording the access time.
    pub fn get_file(&self, id: Uuid, now: DateTime<Utc>) -> Result<StoredFile> {
        let updated = self.conn.execute(
            "UPDATE stored_files SET accessed_at = ?1 WHERE id = ?2",
            params![fmt_ts(&now), id.to_string()],
        )?;
        if updated == 0 {
            return Err(IdeaboxError::not_found("File", id));
        }

        let (blob, metadata, accessed_at, created_at, updated_at) = self.conn.query_row(
            "SELECT blob, metadata, accessed_at, created_at, updated_at
             FROM stored_files WHERE id = ?1",
            [id.to_string()],
            |row| {
                Ok((
                    row.get::<_, Vec<u8>>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )?;

        let metadata: BTreeMap<String, String> = serde_json::from_str(&metadata)?;
        Ok(StoredFile {
            id,
            blob,
            metadata,
            accessed_at: accessed_at.as_deref().map(parse_ts).transpose()?,
            created_at: parse_ts(&created_at)?,
            updated_at: parse_ts(&updated_at)?,
        })
    }

    pub fn delete_file(&self, id: Uuid) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM attachments WHERE stored_file_id = ?1",
            [id.to_string()],
        )?;
        let deleted = tx.execute("DELETE FROM stored_files WHERE id = ?1", [id.to_string()])?;
        if deleted == 0 {
            return Err(IdeaboxError::not_found("File", id));
        }
        tx.commit()?;
        Ok(())
    }

    /// Store `bytes` and attach them to an idea under `file_name`.
    pub fn attach_file(&self, idea_id: Uuid, file_name: &str, bytes: Vec<u8>) -> Result<Attachment> {
        self.get_idea(idea_id)?;
        let file = StoredFile::new(bytes).with_metadata("file_name", file_name);
        let attachment = Attachment::new(idea_id, file.id, file_name.to_string());

        let tx = self.conn.unchecked_transaction()?;
        self.put_file(&file)?;
        tx.execute(
            "INSERT INTO attachments (id, idea_id, stored_file_id, file_name, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                attachment.id.to_string(),
                idea_id.to_string(),
                file.id.to_string(),
                attachment.file_name,
                fmt_ts(&attachment.created_at),
            ],
        )?;
        tx.commit()?;

        info!(idea = %idea_id, file = %file.id, name = %file_name, "attached file");
        Ok(attachment)
    }

    pub fn attachments(&self, idea_id: Uuid) -> Result<Vec<Attachment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, stored_file_id, file_name, created_at FROM attachments
             WHERE idea_id = ?1 ORDER BY created_at ASC, rowid ASC",
        )?;
        let rows = stmt
            .query_map([idea_id.to_string()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, stored_file_id, file_name, created_at)| {
                Ok(Attachment {
                    id: parse_id(&id)?,
                    idea_id,
                    stored_file_id: parse_id(&stored_file_id)?,
                    file_name,
                    created_at: parse_ts(&created_at)?,
                })
            })
            .collect()
    }

    /// Whether a stored file exists, without touching its access time.
    pub fn has_file(&self, id: Uuid) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM stored_files WHERE id = ?1",
                [id.to_string()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }
}
