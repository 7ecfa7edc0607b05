// src/entity/activity.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A comment on an idea. Top-level comments have no parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub idea_id: Uuid,
    pub author_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(idea_id: Uuid, author_id: Uuid, body: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            idea_id,
            author_id,
            parent_id: None,
            body,
            created_at: Utc::now(),
        }
    }

    pub fn reply_to(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn is_toplevel(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A review sign-off recorded while the idea is submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vetting {
    pub id: Uuid,
    pub idea_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Vetting {
    pub fn new(idea_id: Uuid, user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            idea_id,
            user_id,
            created_at: Utc::now(),
        }
    }
}

/// A user backing an idea during the voting stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub id: Uuid,
    pub idea_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    pub fn new(idea_id: Uuid, user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            idea_id,
            user_id,
            created_at: Utc::now(),
        }
    }
}

/// A file attached to an idea, pointing at a stored blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    pub idea_id: Uuid,
    pub stored_file_id: Uuid,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
}

impl Attachment {
    pub fn new(idea_id: Uuid, stored_file_id: Uuid, file_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            idea_id,
            stored_file_id,
            file_name,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_threading() {
        let idea = Uuid::new_v4();
        let author = Uuid::new_v4();
        let top = Comment::new(idea, author, "Love it".to_string());
        assert!(top.is_toplevel());

        let reply = Comment::new(idea, author, "Me too".to_string()).reply_to(top.id);
        assert!(!reply.is_toplevel());
        assert_eq!(reply.parent_id, Some(top.id));
    }
}
