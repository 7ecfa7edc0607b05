//! Display labels, icons and tooltips for ideas.
//!
//! Every lookup is an exhaustive `match` over a closed enum. Raw strings and
//! integers are parsed into those enums first, which is where an unknown
//! value fails with [`InvalidArgument`](crate::IdeaboxError::InvalidArgument).

mod catalog;

pub use catalog::{interpolate, Catalog};

use crate::entity::{Account, Idea, IdeaKind, IdeaSize, IdeaState, SizeField};
use crate::error::Result;
use crate::query::{CategoryFilter, IdeaFilter, IdeaOrder, IdeaView};

pub fn kind_icon(kind: IdeaKind) -> &'static str {
    match kind {
        IdeaKind::Bug => "icon-fire",
        IdeaKind::Chore => "icon-bar-chart",
        IdeaKind::Feature => "icon-beaker",
    }
}

pub fn view_icon(view: IdeaView) -> &'static str {
    match view {
        IdeaView::Cards => "icon-list-alt",
        IdeaView::Board => "icon-columns",
        IdeaView::List => "icon-table",
    }
}

/// Catalog-backed label lookups.
pub struct Labels<'a> {
    catalog: &'a Catalog,
}

impl<'a> Labels<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    fn t(&self, id: &str) -> String {
        self.catalog.lookup(id)
    }

    pub fn size_short(&self, size: IdeaSize) -> String {
        self.t(match size {
            IdeaSize::ExtraSmall => "T-shirt size|XS",
            IdeaSize::Small => "T-shirt size|S",
            IdeaSize::Medium => "T-shirt size|M",
            IdeaSize::Large => "T-shirt size|L",
        })
    }

    pub fn size_long(&self, size: IdeaSize) -> String {
        self.t(match size {
            IdeaSize::ExtraSmall => "T-shirt size|Extra-small",
            IdeaSize::Small => "T-shirt size|Small",
            IdeaSize::Medium => "T-shirt size|Medium",
            IdeaSize::Large => "T-shirt size|Large",
        })
    }

    /// Short size label for a raw ordinal.
    pub fn size_short_of(&self, ordinal: i64) -> Result<String> {
        Ok(self.size_short(IdeaSize::from_ordinal(ordinal)?))
    }

    /// Long size label for a raw ordinal.
    pub fn size_long_of(&self, ordinal: i64) -> Result<String> {
        Ok(self.size_long(IdeaSize::from_ordinal(ordinal)?))
    }

    pub fn state(&self, state: IdeaState) -> String {
        self.t(match state {
            IdeaState::Submitted => "Idea state|submitted",
            IdeaState::Vetted => "Idea state|vetted",
            IdeaState::Voted => "Idea state|voted",
            IdeaState::Picked => "Idea state|picked",
            IdeaState::Designed => "Idea state|designed",
            IdeaState::Approved => "Idea state|approved",
            IdeaState::Implemented => "Idea state|implemented",
            IdeaState::SignedOff => "Idea state|signed off",
            IdeaState::Live => "Idea state|live",
        })
    }

    /// State label for a raw state name.
    pub fn state_of(&self, raw: &str) -> Result<String> {
        Ok(self.state(raw.parse()?))
    }

    pub fn size_field(&self, field: SizeField) -> String {
        self.t(match field {
            SizeField::DesignSize => "Idea size|Design size",
            SizeField::DevelopmentSize => "Idea size|Development size",
        })
    }

    pub fn kind(&self, kind: IdeaKind) -> String {
        self.t(match kind {
            IdeaKind::Feature => "Idea|Feature",
            IdeaKind::Chore => "Idea|Chore",
            IdeaKind::Bug => "Idea|Bug",
        })
    }

    pub fn order(&self, order: IdeaOrder) -> String {
        self.t(match order {
            IdeaOrder::Rating => "Sort by rating",
            IdeaOrder::Activity => "Sort by activity",
            IdeaOrder::Progress => "Sort by progress",
            IdeaOrder::Creation => "Sort by creation",
            IdeaOrder::Size => "Sort by size",
        })
    }

    pub fn filter(&self, filter: IdeaFilter) -> String {
        self.t(match filter {
            IdeaFilter::All => "Unfiltered",
            IdeaFilter::Authored => "Your ideas",
            IdeaFilter::Commented => "Commented by you",
            IdeaFilter::Vetted => "Vetted by you",
            IdeaFilter::Backed => "Backed by you",
        })
    }

    /// Trailing phrase for a filtered list heading; none when unfiltered.
    pub fn filter_qualifier(&self, filter: IdeaFilter) -> Option<String> {
        let id = match filter {
            IdeaFilter::All => return None,
            IdeaFilter::Authored => "that you authored",
            IdeaFilter::Commented => "that you commented",
            IdeaFilter::Vetted => "that you vetted",
            IdeaFilter::Backed => "that you backed",
        };
        Some(self.t(id))
    }

    pub fn category_qualifier(&self, category: &CategoryFilter) -> Option<String> {
        match category {
            CategoryFilter::All => None,
            CategoryFilter::None => Some(self.t("without a category")),
            CategoryFilter::Named(name) => Some(
                self.catalog
                    .format("in the \"%{category}\" category", &[("category", name)]),
            ),
        }
    }

    /// Explain why the action leading to `state` is not offered.
    pub fn unavailable_action_tooltip(&self, idea: &Idea, state: IdeaState) -> String {
        if idea.is_state_in_future(state) {
            match state {
                IdeaState::Vetted => self.t("Tooltip|This idea cannot be vetted yet."),
                IdeaState::Voted => self.t("Tooltip|This idea cannot be backed yet."),
                other => self.catalog.format(
                    "Tooltip|This idea cannot be marked as %{state} yet.",
                    &[("state", &self.state(other))],
                ),
            }
        } else {
            match state {
                IdeaState::Vetted => self.t("Tooltip|This idea has already been vetted."),
                IdeaState::Voted => self.t("Tooltip|This idea cannot be backed anymore."),
                other => self.catalog.format(
                    "Tooltip|This idea has already been %{state}.",
                    &[("state", &self.state(other))],
                ),
            }
        }
    }

    /// `(label, value)` pairs for a kind picker.
    pub fn kind_options(&self) -> Vec<(String, String)> {
        IdeaKind::ALL
            .iter()
            .map(|kind| (self.kind(*kind), kind.to_string()))
            .collect()
    }
}

/// `(label, value)` pairs for a category picker, sorted.
pub fn category_options(account: &Account) -> Vec<(String, String)> {
    let mut categories = account.categories.clone();
    categories.sort();
    categories.into_iter().map(|c| (c.clone(), c)).collect()
}

/// Parse a raw view name and return its icon.
pub fn view_icon_of(raw: &str) -> Result<&'static str> {
    raw.parse::<IdeaView>().map(view_icon)
}

/// Parse a raw size field name and return its label.
pub fn size_field_of(labels: &Labels<'_>, raw: &str) -> Result<String> {
    raw.parse::<SizeField>().map(|field| labels.size_field(field))
}
