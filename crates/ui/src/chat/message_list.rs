use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{ActiveTheme, h_flex, v_flex};
use parley_storage::{MessageRecord, MessageRole};

use crate::chat::state::ChatState;

/// Read-only rendering of the active conversation.
pub struct MessageList {
    chat_state: Entity<ChatState>,
    scroll_handle: ScrollHandle,
}

impl MessageList {
    pub fn new(chat_state: Entity<ChatState>, cx: &mut Context<Self>) -> Self {
        cx.observe(&chat_state, |this, _, cx| {
            this.scroll_handle.scroll_to_bottom();
            cx.notify();
        })
        .detach();

        Self {
            chat_state,
            scroll_handle: ScrollHandle::new(),
        }
    }

    fn render_message(&self, index: usize, message: &MessageRecord, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();
        let from_user = message.role == MessageRole::User;

        h_flex()
            .id(("message-row", index))
            .w_full()
            .when(from_user, |row| row.justify_end())
            .child(
                v_flex()
                    .max_w(relative(0.8))
                    .gap_1()
                    .px_3()
                    .py_2()
                    .rounded_lg()
                    .when(from_user, |bubble| bubble.bg(theme.muted))
                    .when(!from_user, |bubble| bubble.border_1().border_color(theme.border))
                    .child(
                        div()
                            .text_xs()
                            .text_color(theme.muted_foreground)
                            .child(message.role.label()),
                    )
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.foreground)
                            .child(message.content.clone()),
                    ),
            )
            .into_any_element()
    }
}

impl Render for MessageList {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let messages = self.chat_state.read(cx).messages();

        if messages.is_empty() {
            return v_flex()
                .id("message-list-empty")
                .size_full()
                .items_center()
                .justify_center()
                .text_sm()
                .text_color(theme.muted_foreground)
                .child("Send a message to start the conversation.");
        }

        let rows = messages
            .iter()
            .enumerate()
            .map(|(index, message)| self.render_message(index, message, cx))
            .collect::<Vec<_>>();

        v_flex()
            .id("message-list")
            .size_full()
            .gap_3()
            .p_4()
            .overflow_y_scroll()
            .track_scroll(&self.scroll_handle)
            .children(rows)
    }
}
