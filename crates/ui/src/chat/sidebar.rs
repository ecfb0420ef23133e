use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex, v_flex,
};
use parley_storage::{ConversationIndex, ConversationRecord};

use crate::chat::events::{ConversationDeleteRequested, ConversationSelected};
use crate::chat::state::ChatState;

pub struct ChatSidebar {
    chat_state: Entity<ChatState>,
}

impl EventEmitter<ConversationSelected> for ChatSidebar {}
impl EventEmitter<ConversationDeleteRequested> for ChatSidebar {}

impl ChatSidebar {
    pub fn new(chat_state: Entity<ChatState>, cx: &mut Context<Self>) -> Self {
        cx.observe(&chat_state, |_, _, cx| cx.notify()).detach();
        Self { chat_state }
    }

    fn render_row(
        &self,
        position: usize,
        conversation: &ConversationRecord,
        active: bool,
        cx: &Context<Self>,
    ) -> AnyElement {
        let theme = cx.theme();
        let index = ConversationIndex::from(position);
        let message_count = conversation.messages.len();

        h_flex()
            .id(("conversation-row", position))
            .w_full()
            .h(px(40.))
            .px_2()
            .gap_2()
            .rounded_md()
            .items_center()
            .cursor_pointer()
            .when(active, |row| row.bg(theme.muted))
            .hover(|row| row.bg(theme.muted))
            .on_click(cx.listener(move |_, _, _window, cx| {
                cx.emit(ConversationSelected { index });
            }))
            .child(
                v_flex()
                    .flex_1()
                    .min_w_0()
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.foreground)
                            .truncate()
                            .child(conversation.title.clone()),
                    )
                    .child(
                        div()
                            .text_xs()
                            .text_color(theme.muted_foreground)
                            .child(format!("{message_count} messages")),
                    ),
            )
            .child(
                Button::new(("delete-conversation", position))
                    .ghost()
                    .xsmall()
                    .icon(IconName::Delete)
                    .on_click(cx.listener(move |_, _, _window, cx| {
                        cx.stop_propagation();
                        cx.emit(ConversationDeleteRequested { index });
                    })),
            )
            .into_any_element()
    }
}

impl Render for ChatSidebar {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let (conversations, active) = {
            let state = self.chat_state.read(cx);
            (state.conversations(), state.active())
        };

        let rows = conversations
            .iter()
            .enumerate()
            .map(|(position, conversation)| {
                let is_active = active.position() == Some(position);
                self.render_row(position, conversation, is_active, cx)
            })
            .collect::<Vec<_>>();

        v_flex()
            .id("chat-sidebar")
            .size_full()
            .gap_1()
            .p_2()
            .overflow_y_scroll()
            .child(
                div()
                    .px_2()
                    .py_1()
                    .text_xs()
                    .text_color(theme.muted_foreground)
                    .child("Conversations"),
            )
            .when(rows.is_empty(), |list| {
                list.child(
                    div()
                        .px_2()
                        .text_sm()
                        .text_color(theme.muted_foreground)
                        .child("No conversations yet"),
                )
            })
            .children(rows)
    }
}
