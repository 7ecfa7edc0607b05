use thiserror::Error;

use crate::validation::ValidationErrors;

#[derive(Error, Debug)]
pub enum IdeaboxError {
    #[error("Not in an ideabox project. Run 'ideabox init' first.")]
    NotInitialized,

    #[error("Already initialized. Remove .ideabox/ to reinitialize.")]
    AlreadyInitialized,

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// A value outside a closed set reached a lookup or parser.
    #[error("Invalid {field}: '{value}'")]
    InvalidArgument { field: &'static str, value: String },

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Cannot {event} an idea that is {from}")]
    InvalidTransition { event: String, from: String },

    #[error("Not allowed: {0}")]
    NotAllowed(String),

    #[error("File too large: {actual} bytes (max {max})")]
    FileTooLarge { actual: usize, max: usize },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl IdeaboxError {
    pub fn invalid(field: &'static str, value: impl ToString) -> Self {
        IdeaboxError::InvalidArgument {
            field,
            value: value.to_string(),
        }
    }

    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        IdeaboxError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl From<rusqlite::Error> for IdeaboxError {
    fn from(e: rusqlite::Error) -> Self {
        IdeaboxError::Storage(format!("SQLite error: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, IdeaboxError>;
