pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod present;
pub mod query;
pub mod store;
pub mod validation;

pub use error::{IdeaboxError, Result};
pub use store::{ActivityCounts, IdeaStore};
