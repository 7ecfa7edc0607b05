use serde::{Deserialize, Serialize};

use crate::entity::IdeaState;
use crate::error::{IdeaboxError, Result};

/// A per-user view over an account's ideas.
///
/// Stage worklists are pure state filters. `Followed` and `Managed` keep
/// every state but narrow on the requesting user's bookmarks or product
/// manager assignment, which the store resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Worklist {
    #[default]
    Discussable,
    Vettable,
    Votable,
    Pickable,
    Approvable,
    Signoffable,
    Buildable,
    Followed,
    Managed,
}

impl Worklist {
    pub const ALL: [Worklist; 9] = [
        Worklist::Discussable,
        Worklist::Vettable,
        Worklist::Votable,
        Worklist::Pickable,
        Worklist::Approvable,
        Worklist::Signoffable,
        Worklist::Buildable,
        Worklist::Followed,
        Worklist::Managed,
    ];

    /// States an idea must be in to show up.
    pub fn states(self) -> &'static [IdeaState] {
        use IdeaState::*;
        match self {
            Worklist::Vettable => &[Submitted],
            Worklist::Votable => &[Vetted, Voted],
            Worklist::Pickable => &[Voted],
            Worklist::Approvable => &[Designed],
            Worklist::Signoffable => &[Implemented],
            Worklist::Buildable => &[Picked, Designed, Approved, Implemented, SignedOff],
            Worklist::Discussable | Worklist::Followed | Worklist::Managed => &IdeaState::ALL,
        }
    }

    pub fn admits(self, state: IdeaState) -> bool {
        self.states().contains(&state)
    }
}

impl std::fmt::Display for Worklist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Worklist::Discussable => write!(f, "discussable"),
            Worklist::Vettable => write!(f, "vettable"),
            Worklist::Votable => write!(f, "votable"),
            Worklist::Pickable => write!(f, "pickable"),
            Worklist::Approvable => write!(f, "approvable"),
            Worklist::Signoffable => write!(f, "signoffable"),
            Worklist::Buildable => write!(f, "buildable"),
            Worklist::Followed => write!(f, "followed"),
            Worklist::Managed => write!(f, "managed"),
        }
    }
}

impl std::str::FromStr for Worklist {
    type Err = IdeaboxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "discussable" | "all" => Ok(Worklist::Discussable),
            "vettable" => Ok(Worklist::Vettable),
            "votable" => Ok(Worklist::Votable),
            "pickable" => Ok(Worklist::Pickable),
            "approvable" => Ok(Worklist::Approvable),
            "signoffable" => Ok(Worklist::Signoffable),
            "buildable" => Ok(Worklist::Buildable),
            "followed" => Ok(Worklist::Followed),
            "managed" => Ok(Worklist::Managed),
            _ => Err(IdeaboxError::invalid("worklist", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use IdeaState::*;

    #[test]
    fn test_stage_worklists() {
        assert_eq!(Worklist::Vettable.states(), &[Submitted]);
        assert_eq!(Worklist::Votable.states(), &[Vetted, Voted]);
        assert_eq!(Worklist::Pickable.states(), &[Voted]);
        assert_eq!(Worklist::Approvable.states(), &[Designed]);
        assert_eq!(Worklist::Signoffable.states(), &[Implemented]);
        assert_eq!(
            Worklist::Buildable.states(),
            &[Picked, Designed, Approved, Implemented, SignedOff]
        );
    }

    #[test]
    fn test_voted_idea_membership() {
        assert!(Worklist::Votable.admits(Voted));
        assert!(Worklist::Pickable.admits(Voted));
        assert!(!Worklist::Vettable.admits(Voted));
        assert!(!Worklist::Approvable.admits(Voted));
        assert!(!Worklist::Buildable.admits(Voted));
    }

    #[test]
    fn test_live_is_only_discussable() {
        let holding: Vec<_> = Worklist::ALL
            .into_iter()
            .filter(|w| w.admits(Live))
            .collect();
        assert_eq!(
            holding,
            vec![Worklist::Discussable, Worklist::Followed, Worklist::Managed]
        );
    }

    #[test]
    fn test_parse_roundtrip() {
        for worklist in Worklist::ALL {
            assert_eq!(worklist.to_string().parse::<Worklist>().unwrap(), worklist);
        }
        assert!("shippable".parse::<Worklist>().is_err());
    }
}
