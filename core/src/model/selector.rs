use std::fmt;
use std::str::FromStr;

/// Reserved selector value for the whole team.
pub const TEAM: &str = "team";

/// What an operation targets: one robot, or every robot as a virtual
/// aggregate that is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selector {
    #[default]
    Team,
    Robot(String),
}

impl Selector {
    pub fn robot(id: impl Into<String>) -> Self {
        Selector::Robot(id.into())
    }

    pub fn is_team(&self) -> bool {
        matches!(self, Selector::Team)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Team => f.write_str(TEAM),
            Selector::Robot(id) => f.write_str(id),
        }
    }
}

impl FromStr for Selector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == TEAM {
            Ok(Selector::Team)
        } else {
            Ok(Selector::Robot(s.to_string()))
        }
    }
}
