use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tenant. Every idea and user belongs to exactly one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    /// Categories ideas in this account may be filed under.
    pub categories: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(name: String, categories: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            categories,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(account_id: Uuid, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            name,
            created_at: Utc::now(),
        }
    }
}
