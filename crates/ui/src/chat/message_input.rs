use gpui::*;
use gpui_component::{
    ActiveTheme, Disableable, IconName, Sizable,
    button::{Button, ButtonVariants},
    input::{Input, InputEvent, InputState},
    v_flex,
};

use crate::chat::events::Submit;

/// Tracks one draft from Enter until the store has answered.
///
/// The draft stays in the editor while the append is in flight and is only
/// cleared once the store accepted it, so a failed write never eats text.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SubmitGate {
    in_flight: bool,
}

impl SubmitGate {
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Returns the content to send, or `None` for a blank draft or while a send is pending.
    pub fn begin(&mut self, draft: &str) -> Option<String> {
        if self.in_flight || draft.trim().is_empty() {
            return None;
        }

        self.in_flight = true;
        Some(draft.to_string())
    }

    /// Reopens the gate. Returns true when the editor should be cleared.
    pub fn finish(&mut self, accepted: bool) -> bool {
        let was_in_flight = std::mem::take(&mut self.in_flight);
        was_in_flight && accepted
    }
}

pub struct MessageInput {
    input_state: Entity<InputState>,
    gate: SubmitGate,
    pending_newline: bool,
}

impl EventEmitter<Submit> for MessageInput {}

impl MessageInput {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let input_state = cx.new(|cx| {
            InputState::new(window, cx)
                .placeholder("Type your message...")
                .clean_on_escape()
                .auto_grow(3, 10)
        });

        cx.subscribe_in(
            &input_state,
            window,
            |this, _, event: &InputEvent, window, cx| {
                let InputEvent::PressEnter { secondary } = event else {
                    return;
                };

                if *secondary || std::mem::take(&mut this.pending_newline) {
                    return;
                }

                this.strip_enter_newline(window, cx);
                this.submit(cx);
            },
        )
        .detach();

        Self {
            input_state,
            gate: SubmitGate::default(),
            pending_newline: false,
        }
    }

    /// Called by the owner once the store answered the last [`Submit`].
    pub fn finish_submit(&mut self, accepted: bool, window: &mut Window, cx: &mut Context<Self>) {
        if self.gate.finish(accepted) {
            self.input_state.update(cx, |state, cx| {
                state.set_value("", window, cx);
            });
        }
        cx.notify();
    }

    fn insert_newline(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if self.gate.in_flight() {
            return;
        }

        self.pending_newline = true;
        self.input_state.update(cx, |state, cx| {
            state.insert("\n", window, cx);
        });
    }

    fn strip_enter_newline(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| {
            let value = state.value().to_string();
            if let Some(trimmed) = value.strip_suffix('\n') {
                state.set_value(trimmed.to_string(), window, cx);
            }
        });
    }

    fn submit(&mut self, cx: &mut Context<Self>) {
        let draft = self.input_state.read(cx).value().to_string();
        if let Some(content) = self.gate.begin(&draft) {
            cx.emit(Submit::new(content));
            cx.notify();
        }
    }
}

impl Render for MessageInput {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let sending = self.gate.in_flight();

        v_flex()
            .bg(theme.background)
            .gap_2()
            .p_3()
            .child(
                div()
                    .w_full()
                    .px_3()
                    .py_2()
                    .rounded_lg()
                    .border_1()
                    .border_color(theme.border)
                    .on_key_down(cx.listener(|this, event: &KeyDownEvent, window, cx| {
                        if event.keystroke.key == "enter" && event.keystroke.modifiers.shift {
                            this.insert_newline(window, cx);
                        }
                    }))
                    .child(Input::new(&self.input_state).w_full().disabled(sending)),
            )
            .child(
                div().w_full().flex().justify_end().child(
                    Button::new("send")
                        .small()
                        .primary()
                        .icon(if sending {
                            IconName::LoaderCircle
                        } else {
                            IconName::ArrowUp
                        })
                        .child(if sending { "Sending" } else { "Send" })
                        .disabled(sending)
                        .on_click(cx.listener(|this, _, _window, cx| {
                            this.submit(cx);
                        })),
                ),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::SubmitGate;

    #[::core::prelude::v1::test]
    fn blank_drafts_never_open_a_send() {
        let mut gate = SubmitGate::default();
        assert_eq!(gate.begin("   \n"), None);
        assert!(!gate.in_flight());
    }

    #[::core::prelude::v1::test]
    fn rejected_append_keeps_the_draft() {
        let mut gate = SubmitGate::default();
        assert_eq!(gate.begin("hi").as_deref(), Some("hi"));
        assert!(gate.in_flight());

        assert!(!gate.finish(false));
        assert!(!gate.in_flight());
        // The same draft can be retried.
        assert_eq!(gate.begin("hi").as_deref(), Some("hi"));
    }

    #[::core::prelude::v1::test]
    fn accepted_append_clears_the_draft() {
        let mut gate = SubmitGate::default();
        gate.begin("hello");
        assert!(gate.finish(true));
        assert!(!gate.in_flight());
    }

    #[::core::prelude::v1::test]
    fn second_enter_while_sending_is_ignored() {
        let mut gate = SubmitGate::default();
        assert!(gate.begin("one").is_some());
        assert_eq!(gate.begin("one"), None);
        assert!(gate.finish(true));
        // A stray completion with nothing in flight must not clear a new draft.
        assert!(!gate.finish(true));
    }
}
