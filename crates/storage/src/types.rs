use serde::{Deserialize, Serialize};

use super::ids::{ConversationIndex, MessageId};

/// Title given to conversations before their first user message arrives.
pub const DEFAULT_CONVERSATION_TITLE: &str = "New Conversation";
pub const MAX_TITLE_CHARS: usize = 32;

/// Storage-local message role, intentionally decoupled from UI-layer role enums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn label(self) -> &'static str {
        match self {
            Self::System => "System",
            Self::User => "You",
            Self::Assistant => "Assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: MessageId,
    pub role: MessageRole,
    pub content: String,
    pub created_at_unix_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub title: String,
    #[serde(default)]
    pub messages: Vec<MessageRecord>,
    pub updated_at_unix_seconds: u64,
}

impl ConversationRecord {
    pub fn new(updated_at_unix_seconds: u64) -> Self {
        Self {
            title: DEFAULT_CONVERSATION_TITLE.to_string(),
            messages: Vec::new(),
            updated_at_unix_seconds,
        }
    }

    pub(crate) fn push(&mut self, message: MessageRecord) {
        if message.role == MessageRole::User && self.title == DEFAULT_CONVERSATION_TITLE {
            if let Some(title) = title_from_content(&message.content) {
                self.title = title;
            }
        }
        self.updated_at_unix_seconds = message.created_at_unix_seconds;
        self.messages.push(message);
    }
}

/// Persisted form of the whole store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub conversations: Vec<ConversationRecord>,
    #[serde(default)]
    pub active: ConversationIndex,
}

impl StoreSnapshot {
    /// Drops an active index that no longer points at a stored conversation.
    pub fn normalized(mut self) -> Self {
        let in_range = self
            .active
            .position()
            .is_some_and(|position| position < self.conversations.len());
        if !in_range {
            self.active = ConversationIndex::NEW;
        }
        self
    }

    pub fn active_conversation(&self) -> Option<&ConversationRecord> {
        self.active
            .position()
            .and_then(|position| self.conversations.get(position))
    }
}

fn title_from_content(content: &str) -> Option<String> {
    let first_line = content.lines().map(str::trim).find(|line| !line.is_empty())?;
    Some(first_line.chars().take(MAX_TITLE_CHARS).collect())
}
