use parley_storage::ConversationIndex;

/// Emitted when sidebar selection changes the active conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConversationSelected {
    pub index: ConversationIndex,
}

/// Emitted when the user asks to remove a conversation from the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConversationDeleteRequested {
    pub index: ConversationIndex,
}

/// Emitted when the user submits a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submit {
    pub content: String,
}

impl Submit {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Emitted by [`crate::chat::ChatState`] after the store published a new revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreChanged {
    pub revision: u64,
}
