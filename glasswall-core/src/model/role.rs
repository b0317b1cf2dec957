use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Interviewer,
    Candidate,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Interviewer => "INTERVIEWER",
            Role::Candidate => "CANDIDATE",
        }
    }

    /// Lenient parse used for query strings: anything that is not an
    /// interviewer joins as a candidate.
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(str::parse::<Role>) {
            Some(Ok(role)) => role,
            _ => Role::Candidate,
        }
    }

    /// Only interviewers may switch the room into privacy mode.
    pub fn can_toggle_privacy(&self) -> bool {
        matches!(self, Role::Interviewer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct RoleParseError(pub String);

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INTERVIEWER" => Ok(Role::Interviewer),
            "CANDIDATE" => Ok(Role::Candidate),
            _ => Err(RoleParseError(s.to_owned())),
        }
    }
}
