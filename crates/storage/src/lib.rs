pub mod error;
pub mod ids;
pub mod memory;
pub mod types;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub use error::{StoreError, StoreResult};
pub use ids::{ConversationIndex, MessageId};
pub use memory::MemoryConversationStore;
pub use types::{
    ConversationRecord, DEFAULT_CONVERSATION_TITLE, MAX_TITLE_CHARS, MessageRecord, MessageRole,
    StoreSnapshot,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Conversation state shared by every view in the app.
///
/// Reads are synchronous snapshots so they can be taken during render; mutations
/// are asynchronous and bump [`ConversationStore::revision`] on success.
pub trait ConversationStore: Send + Sync {
    /// Messages of the active conversation. Empty when the active index is `NEW`.
    fn messages(&self) -> Arc<Vec<MessageRecord>>;
    fn conversations(&self) -> Arc<Vec<ConversationRecord>>;
    fn active(&self) -> ConversationIndex;
    fn revision(&self) -> u64;
    fn subscribe(&self) -> tokio::sync::watch::Receiver<u64>;
    /// Switches the active conversation. [`ConversationIndex::NEW`] starts a new one.
    fn toggle<'a>(&'a self, index: ConversationIndex) -> BoxFuture<'a, StoreResult<()>>;
    /// Appends to the active conversation, creating one first when the active index is `NEW`.
    fn append_message<'a>(
        &'a self,
        role: MessageRole,
        content: String,
    ) -> BoxFuture<'a, StoreResult<MessageRecord>>;
    fn delete_conversation<'a>(&'a self, index: ConversationIndex)
    -> BoxFuture<'a, StoreResult<()>>;
}
