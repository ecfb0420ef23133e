use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use uuid::Uuid;

use super::error::{InvalidIdSnafu, StoreError, StoreResult};

/// Stable identifier for one stored message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new(raw: Uuid) -> Self {
        Self(raw)
    }

    /// Time-ordered id, so ids minted later sort after earlier ones.
    pub fn new_v7() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn parse(raw: &str) -> StoreResult<Self> {
        let parsed = Uuid::parse_str(raw).context(InvalidIdSnafu {
            stage: "parse-message-id",
            id_type: "message-id",
            raw: raw.to_string(),
        })?;
        Ok(Self(parsed))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl From<Uuid> for MessageId {
    fn from(value: Uuid) -> Self {
        Self::new(value)
    }
}

impl FromStr for MessageId {
    type Err = StoreError;

    fn from_str(raw: &str) -> StoreResult<Self> {
        Self::parse(raw)
    }
}

/// Positional conversation address used by `toggle`.
///
/// Non-negative values point into the conversation list. [`ConversationIndex::NEW`]
/// (`-1`) means "start a new, unindexed conversation".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationIndex(pub i64);

impl ConversationIndex {
    pub const NEW: Self = Self(-1);

    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn is_new(self) -> bool {
        self.0 < 0
    }

    /// Position in the conversation list, `None` for the new-conversation sentinel.
    pub fn position(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl Default for ConversationIndex {
    fn default() -> Self {
        Self::NEW
    }
}

impl From<usize> for ConversationIndex {
    fn from(value: usize) -> Self {
        Self(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl fmt::Display for ConversationIndex {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_has_no_position() {
        assert!(ConversationIndex::NEW.is_new());
        assert_eq!(ConversationIndex::NEW.0, -1);
        assert_eq!(ConversationIndex::NEW.position(), None);
        assert_eq!(ConversationIndex::new(3).position(), Some(3));
        assert_eq!(ConversationIndex::default(), ConversationIndex::NEW);
    }

    #[test]
    fn message_id_parse_rejects_garbage() {
        let id = MessageId::new_v7();
        assert_eq!(id.to_string().parse::<MessageId>().ok(), Some(id));
        assert!(matches!(
            MessageId::parse("not-a-uuid"),
            Err(StoreError::InvalidId { .. })
        ));
    }
}
