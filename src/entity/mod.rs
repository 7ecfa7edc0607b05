mod account;
mod activity;
mod idea;
mod size;
mod state;
mod stored_file;

pub use account::{Account, User};
pub use activity::{Attachment, Comment, Vetting, Vote};
pub use idea::{Idea, IdeaKind, IdeaUpdate, MAX_RATING};
pub use size::{IdeaSize, SizeField};
pub use state::{IdeaEvent, IdeaState};
pub use stored_file::{StoredFile, MAX_BLOB_SIZE};
