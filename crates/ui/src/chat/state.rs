use std::future::Future;
use std::sync::Arc;

use gpui::*;
use parley_storage::{
    ConversationIndex, ConversationRecord, ConversationStore, MessageRecord, MessageRole,
    StoreResult,
};

use crate::app::spawn_reported;
use crate::chat::events::StoreChanged;

/// GPUI-side handle on the conversation store.
///
/// Views read through it during render and observe it to re-render whenever the
/// store publishes a new revision, no matter which caller mutated it.
pub struct ChatState {
    store: Arc<dyn ConversationStore>,
    revision: u64,
    _watch_task: Task<()>,
}

impl EventEmitter<StoreChanged> for ChatState {}

impl ChatState {
    pub fn new(store: Arc<dyn ConversationStore>, cx: &mut Context<Self>) -> Self {
        let mut revisions = store.subscribe();
        let watch_task = cx.spawn(async move |this, cx| {
            while revisions.changed().await.is_ok() {
                let revision = *revisions.borrow_and_update();
                let applied = this.update(cx, |state, cx| state.handle_revision(revision, cx));
                if applied.is_err() {
                    break;
                }
            }
        });

        Self {
            revision: store.revision(),
            store,
            _watch_task: watch_task,
        }
    }

    pub fn store(&self) -> Arc<dyn ConversationStore> {
        self.store.clone()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn messages(&self) -> Arc<Vec<MessageRecord>> {
        self.store.messages()
    }

    pub fn conversations(&self) -> Arc<Vec<ConversationRecord>> {
        self.store.conversations()
    }

    pub fn active(&self) -> ConversationIndex {
        self.store.active()
    }

    pub fn toggle(&self, index: ConversationIndex, cx: &mut Context<Self>) {
        let store = self.store.clone();
        spawn_reported(
            "toggle conversation",
            async move { store.toggle(index).await },
            cx,
        );
    }

    /// Builds the append call; the caller decides how to surface its outcome.
    pub fn append_user_message(
        &self,
        content: String,
    ) -> impl Future<Output = StoreResult<MessageRecord>> + Send + 'static {
        let store = self.store.clone();
        async move { store.append_message(MessageRole::User, content).await }
    }

    pub fn delete_conversation(&self, index: ConversationIndex, cx: &mut Context<Self>) {
        let store = self.store.clone();
        spawn_reported(
            "delete conversation",
            async move { store.delete_conversation(index).await },
            cx,
        );
    }

    fn handle_revision(&mut self, revision: u64, cx: &mut Context<Self>) {
        if revision == self.revision {
            return;
        }

        self.revision = revision;
        cx.emit(StoreChanged { revision });
        cx.notify();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use futures::executor::block_on;
    use parley_storage::MemoryConversationStore;

    use super::*;

    fn record_store_changes(
        state: &Entity<ChatState>,
        cx: &mut TestAppContext,
    ) -> Rc<RefCell<Vec<u64>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        cx.update(|cx| {
            cx.subscribe(state, move |_, event: &StoreChanged, _| {
                sink.borrow_mut().push(event.revision);
            })
            .detach();
        });
        seen
    }

    #[gpui::test]
    async fn store_mutation_notifies_observers(cx: &mut TestAppContext) {
        let store = Arc::new(MemoryConversationStore::new());
        block_on(store.append_message(MessageRole::User, "hello".to_string())).unwrap();

        let state = cx.new(|cx| ChatState::new(store.clone(), cx));
        let seen = record_store_changes(&state, cx);
        assert_eq!(state.read_with(cx, |state, _| state.revision()), 1);

        block_on(store.toggle(ConversationIndex::NEW)).unwrap();
        cx.run_until_parked();

        assert_eq!(*seen.borrow(), vec![2]);
        state.read_with(cx, |state, _| {
            assert_eq!(state.revision(), 2);
            assert!(state.messages().is_empty());
            assert_eq!(state.active(), ConversationIndex::NEW);
            assert_eq!(state.conversations().len(), 1);
        });
    }

    #[gpui::test]
    async fn noop_toggle_emits_nothing(cx: &mut TestAppContext) {
        let store = Arc::new(MemoryConversationStore::new());
        let state = cx.new(|cx| ChatState::new(store.clone(), cx));
        let seen = record_store_changes(&state, cx);

        block_on(store.toggle(ConversationIndex::NEW)).unwrap();
        cx.run_until_parked();

        assert!(seen.borrow().is_empty());
        assert_eq!(state.read_with(cx, |state, _| state.revision()), 0);
    }
}
