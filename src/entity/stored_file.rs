use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Largest blob the `stored_files` table accepts (16 MiB - 1).
pub const MAX_BLOB_SIZE: usize = 16 * 1024 * 1024 - 1;

/// A binary payload with free-form metadata, as kept in `stored_files`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFile {
    pub id: Uuid,
    #[serde(skip)]
    pub blob: Vec<u8>,
    pub metadata: BTreeMap<String, String>,
    pub accessed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredFile {
    pub fn new(blob: Vec<u8>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            blob,
            metadata: BTreeMap::new(),
            accessed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.blob.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blob.is_empty()
    }
}
