use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a room as it appears in the signaling URL path.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct RoomId(String);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RoomIdError {
    #[error("room id is empty")]
    Empty,
    #[error("room id contains reserved character {0:?}")]
    ReservedCharacter(char),
}

impl RoomId {
    pub fn parse(raw: &str) -> Result<Self, RoomIdError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(RoomIdError::Empty);
        }
        if let Some(c) = raw
            .chars()
            .find(|c| matches!(c, '/' | '?' | '#' | '&' | '%') || c.is_whitespace())
        {
            return Err(RoomIdError::ReservedCharacter(c));
        }
        Ok(Self(raw.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
