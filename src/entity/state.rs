use serde::{Deserialize, Serialize};

use crate::error::{IdeaboxError, Result};

/// Where an idea is in the review pipeline.
///
/// The variants are declared in pipeline order and each carries an explicit
/// rank; sorting and "is this still ahead" checks go through [`rank`], never
/// through the display string.
///
/// [`rank`]: IdeaState::rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdeaState {
    #[default]
    Submitted,
    Vetted,
    Voted,
    Picked,
    Designed,
    Approved,
    Implemented,
    SignedOff,
    Live,
}

impl IdeaState {
    pub const ALL: [IdeaState; 9] = [
        IdeaState::Submitted,
        IdeaState::Vetted,
        IdeaState::Voted,
        IdeaState::Picked,
        IdeaState::Designed,
        IdeaState::Approved,
        IdeaState::Implemented,
        IdeaState::SignedOff,
        IdeaState::Live,
    ];

    pub fn rank(self) -> u8 {
        match self {
            IdeaState::Submitted => 0,
            IdeaState::Vetted => 1,
            IdeaState::Voted => 2,
            IdeaState::Picked => 3,
            IdeaState::Designed => 4,
            IdeaState::Approved => 5,
            IdeaState::Implemented => 6,
            IdeaState::SignedOff => 7,
            IdeaState::Live => 8,
        }
    }

    pub fn from_rank(rank: u8) -> Result<Self> {
        Self::ALL
            .get(rank as usize)
            .copied()
            .ok_or_else(|| IdeaboxError::invalid("state rank", rank))
    }

    pub fn is_terminal(self) -> bool {
        self == IdeaState::Live
    }

    /// True iff `target` comes strictly after `self` in the pipeline.
    pub fn is_before(self, target: IdeaState) -> bool {
        target.rank() > self.rank()
    }

    pub fn next(self) -> Option<IdeaState> {
        Self::ALL.get(self.rank() as usize + 1).copied()
    }

    pub fn previous(self) -> Option<IdeaState> {
        (self.rank() as usize)
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IdeaState::Submitted => "submitted",
            IdeaState::Vetted => "vetted",
            IdeaState::Voted => "voted",
            IdeaState::Picked => "picked",
            IdeaState::Designed => "designed",
            IdeaState::Approved => "approved",
            IdeaState::Implemented => "implemented",
            IdeaState::SignedOff => "signed_off",
            IdeaState::Live => "live",
        }
    }
}

impl std::fmt::Display for IdeaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IdeaState {
    type Err = IdeaboxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "submitted" => Ok(IdeaState::Submitted),
            "vetted" => Ok(IdeaState::Vetted),
            "voted" => Ok(IdeaState::Voted),
            "picked" => Ok(IdeaState::Picked),
            "designed" => Ok(IdeaState::Designed),
            "approved" => Ok(IdeaState::Approved),
            "implemented" => Ok(IdeaState::Implemented),
            "signed_off" | "signedoff" => Ok(IdeaState::SignedOff),
            "live" => Ok(IdeaState::Live),
            _ => Err(IdeaboxError::invalid("idea state", s)),
        }
    }
}

/// An explicit lifecycle action. Each event moves an idea along exactly one
/// edge of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdeaEvent {
    Vet,
    Vote,
    Pick,
    Design,
    Approve,
    Implement,
    SignOff,
    GoLive,
}

impl IdeaEvent {
    pub const ALL: [IdeaEvent; 8] = [
        IdeaEvent::Vet,
        IdeaEvent::Vote,
        IdeaEvent::Pick,
        IdeaEvent::Design,
        IdeaEvent::Approve,
        IdeaEvent::Implement,
        IdeaEvent::SignOff,
        IdeaEvent::GoLive,
    ];

    /// The only state this event may fire from.
    pub fn from_state(self) -> IdeaState {
        match self {
            IdeaEvent::Vet => IdeaState::Submitted,
            IdeaEvent::Vote => IdeaState::Vetted,
            IdeaEvent::Pick => IdeaState::Voted,
            IdeaEvent::Design => IdeaState::Picked,
            IdeaEvent::Approve => IdeaState::Designed,
            IdeaEvent::Implement => IdeaState::Approved,
            IdeaEvent::SignOff => IdeaState::Implemented,
            IdeaEvent::GoLive => IdeaState::SignedOff,
        }
    }

    pub fn to_state(self) -> IdeaState {
        match self {
            IdeaEvent::Vet => IdeaState::Vetted,
            IdeaEvent::Vote => IdeaState::Voted,
            IdeaEvent::Pick => IdeaState::Picked,
            IdeaEvent::Design => IdeaState::Designed,
            IdeaEvent::Approve => IdeaState::Approved,
            IdeaEvent::Implement => IdeaState::Implemented,
            IdeaEvent::SignOff => IdeaState::SignedOff,
            IdeaEvent::GoLive => IdeaState::Live,
        }
    }

    /// The event leading into `state`, if any.
    pub fn into_state(state: IdeaState) -> Option<IdeaEvent> {
        Self::ALL.into_iter().find(|e| e.to_state() == state)
    }

    /// Apply this event to `from`, rejecting anything off the adjacency list.
    pub fn apply(self, from: IdeaState) -> Result<IdeaState> {
        if from != self.from_state() {
            return Err(IdeaboxError::InvalidTransition {
                event: self.to_string(),
                from: from.to_string(),
            });
        }
        Ok(self.to_state())
    }
}

impl std::fmt::Display for IdeaEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdeaEvent::Vet => write!(f, "vet"),
            IdeaEvent::Vote => write!(f, "vote"),
            IdeaEvent::Pick => write!(f, "pick"),
            IdeaEvent::Design => write!(f, "design"),
            IdeaEvent::Approve => write!(f, "approve"),
            IdeaEvent::Implement => write!(f, "implement"),
            IdeaEvent::SignOff => write!(f, "sign_off"),
            IdeaEvent::GoLive => write!(f, "go_live"),
        }
    }
}

impl std::str::FromStr for IdeaEvent {
    type Err = IdeaboxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "vet" => Ok(IdeaEvent::Vet),
            "vote" | "back" => Ok(IdeaEvent::Vote),
            "pick" => Ok(IdeaEvent::Pick),
            "design" => Ok(IdeaEvent::Design),
            "approve" => Ok(IdeaEvent::Approve),
            "implement" => Ok(IdeaEvent::Implement),
            "sign_off" | "signoff" => Ok(IdeaEvent::SignOff),
            "go_live" | "golive" => Ok(IdeaEvent::GoLive),
            _ => Err(IdeaboxError::invalid("idea event", s)),
        }
    }
}
