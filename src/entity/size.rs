use serde::{Deserialize, Serialize};

use crate::error::{IdeaboxError, Result};

/// T-shirt size estimate, stored as the ordinal 1..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum IdeaSize {
    ExtraSmall,
    Small,
    Medium,
    Large,
}

impl IdeaSize {
    pub const ALL: [IdeaSize; 4] = [
        IdeaSize::ExtraSmall,
        IdeaSize::Small,
        IdeaSize::Medium,
        IdeaSize::Large,
    ];

    pub fn ordinal(self) -> u8 {
        match self {
            IdeaSize::ExtraSmall => 1,
            IdeaSize::Small => 2,
            IdeaSize::Medium => 3,
            IdeaSize::Large => 4,
        }
    }

    pub fn from_ordinal(value: i64) -> Result<Self> {
        match value {
            1 => Ok(IdeaSize::ExtraSmall),
            2 => Ok(IdeaSize::Small),
            3 => Ok(IdeaSize::Medium),
            4 => Ok(IdeaSize::Large),
            _ => Err(IdeaboxError::invalid("size", value)),
        }
    }
}

impl TryFrom<u8> for IdeaSize {
    type Error = IdeaboxError;

    fn try_from(value: u8) -> Result<Self> {
        Self::from_ordinal(value as i64)
    }
}

impl From<IdeaSize> for u8 {
    fn from(size: IdeaSize) -> u8 {
        size.ordinal()
    }
}

impl std::str::FromStr for IdeaSize {
    type Err = IdeaboxError;

    /// Accepts the ordinal or the short label, case-insensitive.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "1" | "XS" => Ok(IdeaSize::ExtraSmall),
            "2" | "S" => Ok(IdeaSize::Small),
            "3" | "M" => Ok(IdeaSize::Medium),
            "4" | "L" => Ok(IdeaSize::Large),
            _ => Err(IdeaboxError::invalid("size", s)),
        }
    }
}

/// Which of the two estimates a size belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeField {
    DesignSize,
    DevelopmentSize,
}

impl std::fmt::Display for SizeField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SizeField::DesignSize => write!(f, "design_size"),
            SizeField::DevelopmentSize => write!(f, "development_size"),
        }
    }
}

impl std::str::FromStr for SizeField {
    type Err = IdeaboxError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "design_size" => Ok(SizeField::DesignSize),
            "development_size" => Ok(SizeField::DevelopmentSize),
            _ => Err(IdeaboxError::invalid("size field", s)),
        }
    }
}
