use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{IdeaEvent, IdeaSize, IdeaState};
use crate::error::{IdeaboxError, Result};
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdeaKind {
    #[default]
    Feature,
    Chore,
    Bug,
}

impl IdeaKind {
    pub const ALL: [IdeaKind; 3] = [IdeaKind::Feature, IdeaKind::Chore, IdeaKind::Bug];
}

impl std::fmt::Display for IdeaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdeaKind::Feature => write!(f, "feature"),
            IdeaKind::Chore => write!(f, "chore"),
            IdeaKind::Bug => write!(f, "bug"),
        }
    }
}

impl std::str::FromStr for IdeaKind {
    type Err = IdeaboxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "feature" => Ok(IdeaKind::Feature),
            "chore" => Ok(IdeaKind::Chore),
            "bug" => Ok(IdeaKind::Bug),
            _ => Err(IdeaboxError::invalid("idea kind", s)),
        }
    }
}

/// Largest rating magnitude whose density still fits in an `i64`.
pub const MAX_RATING: i64 = i64::MAX / 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Idea {
    pub id: Uuid,
    pub account_id: Uuid,
    pub author_id: Uuid,
    pub product_manager_id: Option<Uuid>,
    pub title: String,
    pub problem: String,
    pub solution: String,
    pub metrics: String,
    pub kind: IdeaKind,
    pub category: Option<String>,
    pub design_size: Option<IdeaSize>,
    pub development_size: Option<IdeaSize>,
    pub rating: i64,
    pub deadline: Option<NaiveDate>,
    state: IdeaState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub active_at: DateTime<Utc>,
}

impl Idea {
    pub fn new(
        account_id: Uuid,
        author_id: Uuid,
        title: String,
        problem: String,
        solution: String,
        metrics: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            account_id,
            author_id,
            product_manager_id: None,
            title,
            problem,
            solution,
            metrics,
            kind: IdeaKind::default(),
            category: None,
            design_size: None,
            development_size: None,
            rating: 0,
            deadline: None,
            state: IdeaState::default(),
            created_at: now,
            updated_at: now,
            active_at: now,
        }
    }

    /// Rebuild an idea loaded from storage, state included.
    pub(crate) fn with_state(mut self, state: IdeaState) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> IdeaState {
        self.state
    }

    pub fn is_state_in_future(&self, target: IdeaState) -> bool {
        self.state.is_before(target)
    }

    /// Fire a lifecycle event. The idea is left untouched on error.
    pub fn fire(&mut self, event: IdeaEvent, now: DateTime<Utc>) -> Result<IdeaState> {
        let from = self.state;
        self.state = event.apply(from)?;
        self.touch(now);
        Ok(from)
    }

    pub fn is_sized(&self) -> bool {
        self.design_size.is_some() && self.development_size.is_some()
    }

    /// The larger of the two estimates, only once both are known.
    pub fn size(&self) -> Option<IdeaSize> {
        match (self.design_size, self.development_size) {
            (Some(design), Some(development)) => Some(design.max(development)),
            _ => None,
        }
    }

    /// Sum of both estimate ordinals, only once both are known.
    pub fn total_size(&self) -> Option<i64> {
        match (self.design_size, self.development_size) {
            (Some(design), Some(development)) => {
                Some(design.ordinal() as i64 + development.ordinal() as i64)
            }
            _ => None,
        }
    }

    /// Record a write at `now`, keeping `active_at` at or past `updated_at`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        if self.updated_at > self.active_at {
            self.active_at = self.updated_at;
        }
    }

    /// Activity on a dependent record (comment, vote, vetting).
    pub fn ping(&mut self, now: DateTime<Utc>) {
        if now > self.active_at {
            self.active_at = now;
        }
        self.touch(now);
    }

    /// Check record-level constraints against the owning account's categories.
    pub fn validate(&self, categories: &[String]) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        for (field, value) in [
            ("title", &self.title),
            ("problem", &self.problem),
            ("solution", &self.solution),
            ("metrics", &self.metrics),
        ] {
            if value.trim().is_empty() {
                errors.add(field, "can't be blank");
            }
        }

        if let Some(category) = &self.category {
            if !categories.iter().any(|c| c == category) {
                errors.add("category", "is not included in the list");
            }
        }

        if self.rating.unsigned_abs() > MAX_RATING.unsigned_abs() {
            errors.add("rating", "is out of range");
        }

        errors
    }

    /// Apply an update, collecting every invalid value instead of stopping at
    /// the first. Fields with invalid input keep their previous value.
    pub fn apply(&mut self, update: IdeaUpdate) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(problem) = update.problem {
            self.problem = problem;
        }
        if let Some(solution) = update.solution {
            self.solution = solution;
        }
        if let Some(metrics) = update.metrics {
            self.metrics = metrics;
        }
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(rating) = update.rating {
            self.rating = rating;
        }
        if let Some(deadline) = update.deadline {
            self.deadline = deadline;
        }
        if let Some(pm) = update.product_manager_id {
            self.product_manager_id = pm;
        }
        if let Some(raw) = update.design_size {
            match raw.map(IdeaSize::from_ordinal).transpose() {
                Ok(size) => self.design_size = size,
                Err(_) => errors.add("design_size", "is not included in the list"),
            }
        }
        if let Some(raw) = update.development_size {
            match raw.map(IdeaSize::from_ordinal).transpose() {
                Ok(size) => self.development_size = size,
                Err(_) => errors.add("development_size", "is not included in the list"),
            }
        }

        errors
    }
}

/// Update payload for an idea. `Some(None)` clears an optional field.
///
/// Sizes stay raw integers so out-of-range input is reported as a validation
/// message rather than a parse failure.
#[derive(Debug, Default, Clone)]
pub struct IdeaUpdate {
    pub title: Option<String>,
    pub problem: Option<String>,
    pub solution: Option<String>,
    pub metrics: Option<String>,
    pub kind: Option<IdeaKind>,
    pub category: Option<Option<String>>,
    pub design_size: Option<Option<i64>>,
    pub development_size: Option<Option<i64>>,
    pub rating: Option<i64>,
    pub deadline: Option<Option<NaiveDate>>,
    pub product_manager_id: Option<Option<Uuid>>,
}
