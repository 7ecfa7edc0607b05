//! Sort orders for idea lists.
//!
//! Every order exists twice: as an in-memory comparator and as the SQL
//! `ORDER BY` the store runs. Tests keep the two in agreement.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::entity::Idea;
use crate::error::{IdeaboxError, Result};

/// Key given to ideas that are not fully sized when ordering by rating.
pub const UNSIZED_DENSITY: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdeaOrder {
    #[default]
    Rating,
    Activity,
    Progress,
    Creation,
    Size,
}

impl IdeaOrder {
    pub const ALL: [IdeaOrder; 5] = [
        IdeaOrder::Rating,
        IdeaOrder::Activity,
        IdeaOrder::Progress,
        IdeaOrder::Creation,
        IdeaOrder::Size,
    ];

    /// Compare two ideas; `Less` means `a` is listed first.
    pub fn compare(self, a: &Idea, b: &Idea) -> Ordering {
        match self {
            IdeaOrder::Rating => rating_density(b).cmp(&rating_density(a)),
            IdeaOrder::Activity => b.active_at.cmp(&a.active_at),
            IdeaOrder::Progress => b.state().rank().cmp(&a.state().rank()),
            IdeaOrder::Creation => b.created_at.cmp(&a.created_at),
            IdeaOrder::Size => match (a.total_size(), b.total_size()) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }

    /// Stable sort; ties keep their incoming order.
    pub fn sort(self, ideas: &mut [Idea]) {
        ideas.sort_by(|a, b| self.compare(a, b));
    }

    /// `ORDER BY` body for the `ideas` table. Ties fall back to insertion
    /// order so SQL and [`IdeaOrder::sort`] agree.
    pub fn sql(self) -> &'static str {
        match self {
            IdeaOrder::Rating => {
                "COALESCE(1000 * ideas.rating / (ideas.development_size + ideas.design_size), -1) DESC, ideas.rowid ASC"
            }
            IdeaOrder::Activity => "ideas.active_at DESC, ideas.rowid ASC",
            IdeaOrder::Progress => "ideas.state_rank DESC, ideas.rowid ASC",
            IdeaOrder::Creation => "ideas.created_at DESC, ideas.rowid ASC",
            IdeaOrder::Size => {
                "(ideas.development_size + ideas.design_size) IS NULL, (ideas.development_size + ideas.design_size) ASC, ideas.rowid ASC"
            }
        }
    }
}

/// `1000 * rating / (development_size + design_size)` with truncating
/// division, or [`UNSIZED_DENSITY`] when either size is missing.
///
/// Ratings beyond [`MAX_RATING`](crate::entity::MAX_RATING) never pass
/// validation; for unsaved ideas the product saturates.
pub fn rating_density(idea: &Idea) -> i64 {
    match idea.total_size() {
        Some(total) => idea.rating.saturating_mul(1000) / total,
        None => UNSIZED_DENSITY,
    }
}

impl std::fmt::Display for IdeaOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdeaOrder::Rating => write!(f, "rating"),
            IdeaOrder::Activity => write!(f, "activity"),
            IdeaOrder::Progress => write!(f, "progress"),
            IdeaOrder::Creation => write!(f, "creation"),
            IdeaOrder::Size => write!(f, "size"),
        }
    }
}

impl std::str::FromStr for IdeaOrder {
    type Err = IdeaboxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "rating" => Ok(IdeaOrder::Rating),
            "activity" => Ok(IdeaOrder::Activity),
            "progress" => Ok(IdeaOrder::Progress),
            "creation" => Ok(IdeaOrder::Creation),
            "size" => Ok(IdeaOrder::Size),
            _ => Err(IdeaboxError::invalid("order", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{IdeaEvent, IdeaSize};
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn idea(title: &str, rating: i64, sizes: Option<(u8, u8)>) -> Idea {
        let mut idea = Idea::new(
            Uuid::nil(),
            Uuid::nil(),
            title.to_string(),
            "p".to_string(),
            "s".to_string(),
            "m".to_string(),
        );
        idea.rating = rating;
        if let Some((design, development)) = sizes {
            idea.design_size = Some(IdeaSize::try_from(design).unwrap());
            idea.development_size = Some(IdeaSize::try_from(development).unwrap());
        }
        idea
    }

    fn titles(ideas: &[Idea]) -> Vec<&str> {
        ideas.iter().map(|i| i.title.as_str()).collect()
    }

    #[test]
    fn test_rating_density_values() {
        assert_eq!(rating_density(&idea("a", 8, Some((2, 2)))), 2000);
        assert_eq!(rating_density(&idea("b", 10, Some((1, 1)))), 5000);
        // 1000 * 10 / 3 truncates
        assert_eq!(rating_density(&idea("c", 10, Some((1, 2)))), 3333);
        assert_eq!(rating_density(&idea("d", 99, None)), UNSIZED_DENSITY);

        let mut half = idea("e", 99, None);
        half.design_size = Some(IdeaSize::Small);
        assert_eq!(rating_density(&half), UNSIZED_DENSITY);
    }

    #[test]
    fn test_negative_rating_truncates_toward_zero() {
        assert_eq!(rating_density(&idea("a", -1, Some((3, 4)))), -142);
    }

    #[test]
    fn test_rating_density_at_the_limits() {
        use crate::entity::MAX_RATING;
        assert_eq!(
            rating_density(&idea("max", MAX_RATING, Some((1, 1)))),
            MAX_RATING * 1000 / 2
        );
        let huge = idea("huge", 10_000_000_000_000_000, Some((1, 1)));
        assert_eq!(rating_density(&huge), i64::MAX / 2);
        assert_eq!(rating_density(&idea("min", i64::MIN, Some((1, 1)))), i64::MIN / 2);
    }

    #[test]
    fn test_order_by_rating_puts_unsized_last() {
        let mut ideas = vec![
            idea("unsized", 50, None),
            idea("dense", 10, Some((1, 1))),
            idea("sparse", 8, Some((2, 2))),
            idea("zero", 0, Some((4, 4))),
        ];
        IdeaOrder::Rating.sort(&mut ideas);
        assert_eq!(titles(&ideas), ["dense", "sparse", "zero", "unsized"]);
    }

    #[test]
    fn test_order_by_size_ascending_unsized_last() {
        let mut ideas = vec![
            idea("unsized", 0, None),
            idea("big", 0, Some((4, 4))),
            idea("small", 0, Some((1, 1))),
            idea("mid", 0, Some((2, 3))),
        ];
        IdeaOrder::Size.sort(&mut ideas);
        assert_eq!(titles(&ideas), ["small", "mid", "big", "unsized"]);
    }

    #[test]
    fn test_order_by_progress() {
        let now = Utc::now();
        let submitted = idea("submitted", 0, None);
        let mut voted = idea("voted", 0, None);
        voted.fire(IdeaEvent::Vet, now).unwrap();
        voted.fire(IdeaEvent::Vote, now).unwrap();
        let mut vetted = idea("vetted", 0, None);
        vetted.fire(IdeaEvent::Vet, now).unwrap();

        let mut ideas = vec![submitted, voted, vetted];
        IdeaOrder::Progress.sort(&mut ideas);
        assert_eq!(titles(&ideas), ["voted", "vetted", "submitted"]);
    }

    #[test]
    fn test_order_by_activity_and_creation() {
        let base = Utc::now();
        let mut old = idea("old", 0, None);
        old.created_at = base - Duration::days(3);
        old.ping(base + Duration::hours(1));
        let mut new = idea("new", 0, None);
        new.created_at = base;
        new.active_at = base;

        let mut ideas = vec![new.clone(), old.clone()];
        IdeaOrder::Activity.sort(&mut ideas);
        assert_eq!(titles(&ideas), ["old", "new"]);

        IdeaOrder::Creation.sort(&mut ideas);
        assert_eq!(titles(&ideas), ["new", "old"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let mut ideas = vec![
            idea("first", 4, Some((1, 1))),
            idea("second", 4, Some((1, 1))),
            idea("third", 4, Some((1, 1))),
        ];
        IdeaOrder::Rating.sort(&mut ideas);
        assert_eq!(titles(&ideas), ["first", "second", "third"]);
    }

    #[test]
    fn test_parse_order() {
        for order in IdeaOrder::ALL {
            assert_eq!(order.to_string().parse::<IdeaOrder>().unwrap(), order);
        }
        assert!("popularity".parse::<IdeaOrder>().is_err());
    }
}
