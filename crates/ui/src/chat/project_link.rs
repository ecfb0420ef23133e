use std::sync::Arc;

use gpui::*;
use gpui_component::{
    IconName, Sizable,
    button::{Button, ButtonVariants},
};
use parley_storage::{BoxFuture, ConversationIndex, ConversationStore, StoreResult};

use crate::app::spawn_reported;
use crate::chat::state::ChatState;
use crate::navigation::{HOME_PATH, Navigator};

/// The two faces of the project link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkVariant {
    /// The active conversation has messages: offer to start a fresh one.
    NewConversation,
    /// Nothing to leave behind: offer to go back to the application root.
    Home,
}

/// Side effect bound to a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    Toggle(ConversationIndex),
    OpenWindow(&'static str),
}

impl LinkVariant {
    pub fn for_message_count(count: usize) -> Self {
        if count > 0 {
            Self::NewConversation
        } else {
            Self::Home
        }
    }

    pub fn icon(self) -> IconName {
        match self {
            Self::NewConversation => IconName::Plus,
            Self::Home => IconName::LayoutDashboard,
        }
    }

    pub fn element_id(self) -> &'static str {
        match self {
            Self::NewConversation => "project-link-new-conversation",
            Self::Home => "project-link-home",
        }
    }

    pub fn tooltip(self) -> &'static str {
        match self {
            Self::NewConversation => "New conversation",
            Self::Home => "Home",
        }
    }

    pub fn action(self) -> LinkAction {
        match self {
            Self::NewConversation => LinkAction::Toggle(ConversationIndex::NEW),
            Self::Home => LinkAction::OpenWindow(HOME_PATH),
        }
    }
}

/// Store and navigator wiring behind the project link, free of any view state.
#[derive(Clone)]
pub struct LinkControl {
    store: Arc<dyn ConversationStore>,
    navigator: Arc<dyn Navigator>,
}

impl LinkControl {
    pub fn new(store: Arc<dyn ConversationStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator }
    }

    pub fn variant(&self) -> LinkVariant {
        LinkVariant::for_message_count(self.store.messages().len())
    }

    /// Runs the action of `variant`, the one that was on screen when the click landed.
    ///
    /// Navigation fires immediately and the returned future is already complete.
    /// A toggle only starts once the future is polled; its error is returned untouched.
    pub fn activate(&self, variant: LinkVariant) -> BoxFuture<'static, StoreResult<()>> {
        match variant.action() {
            LinkAction::Toggle(index) => {
                let store = self.store.clone();
                Box::pin(async move { store.toggle(index).await })
            }
            LinkAction::OpenWindow(path) => {
                self.navigator.open_window(path);
                Box::pin(futures::future::ready(StoreResult::Ok(())))
            }
        }
    }
}

/// Toolbar button that starts a new conversation or goes home.
pub struct ProjectLink {
    control: LinkControl,
}

impl ProjectLink {
    pub fn new(
        chat_state: &Entity<ChatState>,
        navigator: Arc<dyn Navigator>,
        cx: &mut Context<Self>,
    ) -> Self {
        cx.observe(chat_state, |_, _, cx| cx.notify()).detach();

        Self {
            control: LinkControl::new(chat_state.read(cx).store(), navigator),
        }
    }

    pub fn control(&self) -> &LinkControl {
        &self.control
    }

    fn activate(&mut self, variant: LinkVariant, cx: &mut Context<Self>) {
        match variant {
            LinkVariant::NewConversation => {
                spawn_reported("start new conversation", self.control.activate(variant), cx);
            }
            LinkVariant::Home => {
                // Navigation is queued inside `activate`; the returned future is already done.
                let _ = self.control.activate(variant);
            }
        }
    }
}

impl Render for ProjectLink {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let variant = self.control.variant();

        Button::new(variant.element_id())
            .outline()
            .small()
            .icon(variant.icon())
            .tooltip(variant.tooltip())
            .on_click(cx.listener(move |this, _, _window, cx| {
                this.activate(variant, cx);
            }))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::Mutex;

    use futures::executor::block_on;

    use parley_storage::{
        ConversationRecord, MemoryConversationStore, MessageRecord, MessageRole,
    };

    use super::*;
    use crate::navigation::RecordingNavigator;

    /// Delegates to an in-memory store and records every toggle argument.
    #[derive(Default)]
    struct RecordingStore {
        inner: MemoryConversationStore,
        toggles: Mutex<Vec<ConversationIndex>>,
    }

    impl RecordingStore {
        async fn with_messages(count: usize) -> Self {
            let store = Self::default();
            for index in 0..count {
                store
                    .inner
                    .append_message(MessageRole::User, format!("message {index}"))
                    .await
                    .unwrap();
            }
            store
        }

        fn toggles(&self) -> Vec<ConversationIndex> {
            self.toggles.lock().unwrap().clone()
        }
    }

    impl ConversationStore for RecordingStore {
        fn messages(&self) -> Arc<Vec<MessageRecord>> {
            self.inner.messages()
        }

        fn conversations(&self) -> Arc<Vec<ConversationRecord>> {
            self.inner.conversations()
        }

        fn active(&self) -> ConversationIndex {
            self.inner.active()
        }

        fn revision(&self) -> u64 {
            self.inner.revision()
        }

        fn subscribe(&self) -> tokio::sync::watch::Receiver<u64> {
            self.inner.subscribe()
        }

        fn toggle<'a>(&'a self, index: ConversationIndex) -> BoxFuture<'a, StoreResult<()>> {
            self.toggles.lock().unwrap().push(index);
            self.inner.toggle(index)
        }

        fn append_message<'a>(
            &'a self,
            role: MessageRole,
            content: String,
        ) -> BoxFuture<'a, StoreResult<MessageRecord>> {
            self.inner.append_message(role, content)
        }

        fn delete_conversation<'a>(
            &'a self,
            index: ConversationIndex,
        ) -> BoxFuture<'a, StoreResult<()>> {
            self.inner.delete_conversation(index)
        }
    }

    fn control_for(store: &Arc<RecordingStore>, navigator: &RecordingNavigator) -> LinkControl {
        LinkControl::new(store.clone(), Arc::new(navigator.clone()))
    }

    #[::core::prelude::v1::test]
    fn variant_follows_message_count() {
        assert_eq!(LinkVariant::for_message_count(0), LinkVariant::Home);
        for count in [1, 2, 50, usize::MAX] {
            assert_eq!(
                LinkVariant::for_message_count(count),
                LinkVariant::NewConversation
            );
        }
        assert_eq!(
            LinkVariant::NewConversation.action(),
            LinkAction::Toggle(ConversationIndex::NEW)
        );
        assert_eq!(LinkVariant::Home.action(), LinkAction::OpenWindow("/"));
        assert_ne!(
            LinkVariant::NewConversation.element_id(),
            LinkVariant::Home.element_id()
        );
    }

    #[tokio::test]
    async fn empty_conversation_links_home() {
        let store = Arc::new(RecordingStore::default());
        let navigator = RecordingNavigator::default();
        let control = control_for(&store, &navigator);

        let variant = control.variant();
        assert_eq!(variant, LinkVariant::Home);
        assert!(matches!(variant.icon(), IconName::LayoutDashboard));

        control.activate(variant).await.unwrap();
        assert_eq!(navigator.opened(), vec!["/".to_string()]);
        assert!(store.toggles().is_empty());
    }

    #[tokio::test]
    async fn home_navigation_does_not_wait_for_polling() {
        let store = Arc::new(RecordingStore::default());
        let navigator = RecordingNavigator::default();
        let control = control_for(&store, &navigator);

        drop(control.activate(LinkVariant::Home));
        assert_eq!(navigator.opened(), vec!["/".to_string()]);
    }

    #[tokio::test]
    async fn conversation_with_messages_starts_a_new_one() {
        let store = Arc::new(RecordingStore::with_messages(1).await);
        let navigator = RecordingNavigator::default();
        let control = control_for(&store, &navigator);

        let variant = control.variant();
        assert_eq!(variant, LinkVariant::NewConversation);
        assert!(matches!(variant.icon(), IconName::Plus));

        control.activate(variant).await.unwrap();
        assert_eq!(store.toggles(), vec![ConversationIndex::NEW]);
        assert!(navigator.opened().is_empty());
    }

    #[tokio::test]
    async fn clearing_the_conversation_switches_to_home() {
        let store = Arc::new(RecordingStore::with_messages(1).await);
        let navigator = RecordingNavigator::default();
        let control = control_for(&store, &navigator);

        assert_eq!(control.variant(), LinkVariant::NewConversation);
        control.activate(control.variant()).await.unwrap();

        let next = control.variant();
        assert_eq!(next, LinkVariant::Home);
        control.activate(next).await.unwrap();

        assert_eq!(store.toggles(), vec![ConversationIndex::NEW]);
        assert_eq!(navigator.opened(), vec!["/".to_string()]);
    }

    #[tokio::test]
    async fn double_activation_is_not_suppressed() {
        let store = Arc::new(RecordingStore::with_messages(2).await);
        let navigator = RecordingNavigator::default();
        let control = control_for(&store, &navigator);

        let variant = control.variant();
        let first = control.activate(variant);
        let second = control.activate(variant);
        first.await.unwrap();
        second.await.unwrap();

        assert_eq!(
            store.toggles(),
            vec![ConversationIndex::NEW, ConversationIndex::NEW]
        );
        assert!(navigator.opened().is_empty());
    }

    #[tokio::test]
    async fn rerendering_without_changes_keeps_the_variant() {
        let store = Arc::new(RecordingStore::with_messages(3).await);
        let navigator = RecordingNavigator::default();
        let control = control_for(&store, &navigator);

        let variants = (0..5).map(|_| control.variant()).collect::<Vec<_>>();
        assert!(variants.iter().all(|v| *v == LinkVariant::NewConversation));
        assert!(store.toggles().is_empty());
    }

    #[tokio::test]
    async fn toggle_failure_reaches_the_caller() {
        struct FailingStore(MemoryConversationStore);

        impl ConversationStore for FailingStore {
            fn messages(&self) -> Arc<Vec<MessageRecord>> {
                self.0.messages()
            }
            fn conversations(&self) -> Arc<Vec<ConversationRecord>> {
                self.0.conversations()
            }
            fn active(&self) -> ConversationIndex {
                self.0.active()
            }
            fn revision(&self) -> u64 {
                self.0.revision()
            }
            fn subscribe(&self) -> tokio::sync::watch::Receiver<u64> {
                self.0.subscribe()
            }
            fn toggle<'a>(&'a self, _index: ConversationIndex) -> BoxFuture<'a, StoreResult<()>> {
                // Index 7 never exists in an empty store.
                self.0.toggle(ConversationIndex::new(7))
            }
            fn append_message<'a>(
                &'a self,
                role: MessageRole,
                content: String,
            ) -> BoxFuture<'a, StoreResult<MessageRecord>> {
                self.0.append_message(role, content)
            }
            fn delete_conversation<'a>(
                &'a self,
                index: ConversationIndex,
            ) -> BoxFuture<'a, StoreResult<()>> {
                self.0.delete_conversation(index)
            }
        }

        let store = Arc::new(FailingStore(MemoryConversationStore::new()));
        let navigator = RecordingNavigator::default();
        let control = LinkControl::new(store, Arc::new(navigator.clone()));

        let result = control.activate(LinkVariant::NewConversation).await;
        assert!(result.is_err());
        assert!(navigator.opened().is_empty());
    }

    #[gpui::test]
    async fn view_rebinds_when_the_conversation_is_cleared(cx: &mut TestAppContext) {
        let store = Arc::new(MemoryConversationStore::new());
        block_on(store.append_message(MessageRole::User, "hi".to_string())).unwrap();
        let navigator = RecordingNavigator::default();

        let chat_state = cx.new(|cx| ChatState::new(store.clone(), cx));
        let link = cx.new(|cx| ProjectLink::new(&chat_state, Arc::new(navigator.clone()), cx));

        let renders = Rc::new(Cell::new(0usize));
        let counter = renders.clone();
        cx.update(|cx| {
            cx.observe(&link, move |_, _| counter.set(counter.get() + 1))
                .detach();
        });

        assert_eq!(
            link.read_with(cx, |link, _| link.control().variant()),
            LinkVariant::NewConversation
        );

        block_on(store.toggle(ConversationIndex::NEW)).unwrap();
        cx.run_until_parked();

        assert!(renders.get() >= 1);
        let variant = link.read_with(cx, |link, _| link.control().variant());
        assert_eq!(variant, LinkVariant::Home);

        link.update(cx, |link, cx| link.activate(variant, cx));
        assert_eq!(navigator.opened(), vec!["/".to_string()]);
        assert_eq!(store.active(), ConversationIndex::NEW);
    }
}
