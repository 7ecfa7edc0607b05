//! Listing parameters for idea queries: worklist, relationship filter,
//! category filter, sort order and view.

mod order;
mod worklist;

pub use order::{rating_density, IdeaOrder, UNSIZED_DENSITY};
pub use worklist::Worklist;

use serde::{Deserialize, Serialize};

use crate::error::{IdeaboxError, Result};

/// Narrow a list to ideas the requesting user has a relationship with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdeaFilter {
    #[default]
    All,
    Authored,
    Commented,
    Vetted,
    Backed,
}

impl IdeaFilter {
    pub const ALL: [IdeaFilter; 5] = [
        IdeaFilter::All,
        IdeaFilter::Authored,
        IdeaFilter::Commented,
        IdeaFilter::Vetted,
        IdeaFilter::Backed,
    ];
}

impl std::fmt::Display for IdeaFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdeaFilter::All => write!(f, "all"),
            IdeaFilter::Authored => write!(f, "authored"),
            IdeaFilter::Commented => write!(f, "commented"),
            IdeaFilter::Vetted => write!(f, "vetted"),
            IdeaFilter::Backed => write!(f, "backed"),
        }
    }
}

impl std::str::FromStr for IdeaFilter {
    type Err = IdeaboxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "all" => Ok(IdeaFilter::All),
            "authored" => Ok(IdeaFilter::Authored),
            "commented" => Ok(IdeaFilter::Commented),
            "vetted" => Ok(IdeaFilter::Vetted),
            "backed" => Ok(IdeaFilter::Backed),
            _ => Err(IdeaboxError::invalid("filter", s)),
        }
    }
}

/// Category narrowing. `none` selects uncategorized ideas.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
    #[default]
    All,
    None,
    Named(String),
}

impl std::fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryFilter::All => write!(f, "all"),
            CategoryFilter::None => write!(f, "none"),
            CategoryFilter::Named(name) => write!(f, "{}", name),
        }
    }
}

impl std::str::FromStr for CategoryFilter {
    type Err = IdeaboxError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" => Err(IdeaboxError::invalid("category", s)),
            "all" => Ok(CategoryFilter::All),
            "none" => Ok(CategoryFilter::None),
            name => Ok(CategoryFilter::Named(name.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdeaView {
    #[default]
    Cards,
    Board,
    List,
}

impl IdeaView {
    pub const ALL: [IdeaView; 3] = [IdeaView::Cards, IdeaView::Board, IdeaView::List];
}

impl std::fmt::Display for IdeaView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdeaView::Cards => write!(f, "cards"),
            IdeaView::Board => write!(f, "board"),
            IdeaView::List => write!(f, "list"),
        }
    }
}

impl std::str::FromStr for IdeaView {
    type Err = IdeaboxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cards" => Ok(IdeaView::Cards),
            "board" => Ok(IdeaView::Board),
            "list" => Ok(IdeaView::List),
            _ => Err(IdeaboxError::invalid("view", s)),
        }
    }
}

/// Everything needed to list ideas for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdeaQuery {
    pub worklist: Worklist,
    pub filter: IdeaFilter,
    pub category: CategoryFilter,
    pub order: IdeaOrder,
    /// Drop ideas the requesting user has already vetted.
    pub not_vetted: bool,
    pub limit: Option<usize>,
}

impl IdeaQuery {
    pub fn new(worklist: Worklist) -> Self {
        Self {
            worklist,
            ..Self::default()
        }
    }

    pub fn order(mut self, order: IdeaOrder) -> Self {
        self.order = order;
        self
    }

    pub fn filter(mut self, filter: IdeaFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn category(mut self, category: CategoryFilter) -> Self {
        self.category = category;
        self
    }
}

/// Parse a query string such as `votable order:size filter:backed
/// category:UX` into an [`IdeaQuery`].
///
/// A bare word names the worklist. Unknown prefixes and values are rejected.
pub fn parse_query(raw: &str) -> Result<IdeaQuery> {
    let mut query = IdeaQuery::default();

    for token in raw.split_whitespace() {
        if let Some(value) = token.strip_prefix("order:") {
            query.order = value.parse()?;
        } else if let Some(value) = token.strip_prefix("filter:") {
            query.filter = value.parse()?;
        } else if let Some(value) = token.strip_prefix("category:") {
            query.category = value.parse()?;
        } else if let Some(value) = token.strip_prefix("limit:") {
            let limit = value
                .parse()
                .map_err(|_| IdeaboxError::invalid("limit", value))?;
            query.limit = Some(limit);
        } else if token == "not-vetted" {
            query.not_vetted = true;
        } else {
            query.worklist = token.parse()?;
        }
    }

    Ok(query)
}
