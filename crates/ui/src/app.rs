use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex, v_flex,
};
use gpui_tokio_bridge::{JoinError, Tokio};
use parley_storage::{ConversationIndex, ConversationStore, StoreResult};

use crate::chat::{
    ChatSidebar, ChatState, ConversationDeleteRequested, ConversationSelected, MessageInput,
    MessageList, ProjectLink, Submit,
};
use crate::navigation::{CHAT_PATH, HOME_PATH, Route, Router};
use crate::settings::{SettingsChanged, SettingsState};

pub const SIDEBAR_WIDTH: f32 = 260.0;
const TOOLBAR_HEIGHT: f32 = 40.0;
#[cfg(target_os = "macos")]
const WINDOW_TOOLBAR_LEFT_SAFE_PADDING: f32 = 78.0;
#[cfg(not(target_os = "macos"))]
const WINDOW_TOOLBAR_LEFT_SAFE_PADDING: f32 = 16.0;

gpui::actions!(shell, [NewChat, GoHome, ToggleTheme, Quit]);

/// Application-wide sink for failures nobody handles locally.
pub fn report_unhandled(context: &str, error: &dyn Display) {
    tracing::error!("unhandled error during {context}: {error}");
}

/// Runs a store call on the Tokio runtime without blocking the caller.
///
/// The caller does not observe the outcome; failures go to [`report_unhandled`].
pub fn spawn_reported<V, F, T>(context: &'static str, call: F, cx: &mut Context<V>)
where
    V: 'static,
    F: Future<Output = StoreResult<T>> + Send + 'static,
    T: Send + 'static,
{
    let task = Tokio::spawn(cx, call);
    cx.spawn(async move |_this, _cx| {
        settle_reported(context, task).await;
    })
    .detach();
}

/// Awaits a Tokio-spawned store call, sending any failure to [`report_unhandled`].
pub async fn settle_reported<T>(
    context: &'static str,
    task: Task<Result<StoreResult<T>, JoinError>>,
) -> Option<T> {
    match task.await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(error)) => {
            report_unhandled(context, &error);
            None
        }
        Err(error) => {
            report_unhandled(context, &format!("tokio task failed: {error:?}"));
            None
        }
    }
}

/// Main window: toolbar with the project link, then either home or the chat page.
pub struct ParleyShell {
    chat_state: Entity<ChatState>,
    router: Entity<Router>,
    settings_state: Entity<SettingsState>,
    project_link: Entity<ProjectLink>,
    sidebar: Entity<ChatSidebar>,
    message_list: Entity<MessageList>,
    message_input: Entity<MessageInput>,
    title_bar_should_move: bool,
}

impl ParleyShell {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        settings_state: Entity<SettingsState>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let chat_state = cx.new(|cx| ChatState::new(store, cx));
        let router = cx.new(Router::new);
        let navigator = router.read(cx).navigator();
        let project_link = cx.new(|cx| ProjectLink::new(&chat_state, navigator, cx));
        let sidebar = cx.new(|cx| ChatSidebar::new(chat_state.clone(), cx));
        let message_list = cx.new(|cx| MessageList::new(chat_state.clone(), cx));
        let message_input = cx.new(|cx| MessageInput::new(window, cx));

        cx.observe(&router, |_, _, cx| cx.notify()).detach();

        cx.subscribe(&sidebar, |this, _, event: &ConversationSelected, cx| {
            this.chat_state
                .update(cx, |state, cx| state.toggle(event.index, cx));
        })
        .detach();

        cx.subscribe(&sidebar, |this, _, event: &ConversationDeleteRequested, cx| {
            this.chat_state
                .update(cx, |state, cx| state.delete_conversation(event.index, cx));
        })
        .detach();

        cx.subscribe_in(
            &message_input,
            window,
            |this, _, event: &Submit, window, cx| {
                this.handle_submit(event.clone(), window, cx);
            },
        )
        .detach();

        cx.subscribe_in(
            &settings_state,
            window,
            |_, _, event: &SettingsChanged, window, cx| {
                event.settings.apply_theme(Some(window), cx);
            },
        )
        .detach();

        Self {
            chat_state,
            router,
            settings_state,
            project_link,
            sidebar,
            message_list,
            message_input,
            title_bar_should_move: false,
        }
    }

    pub fn route(&self, cx: &App) -> Route {
        self.router.read(cx).route()
    }

    fn open(&mut self, path: &str, cx: &mut Context<Self>) {
        self.router.update(cx, |router, cx| router.open(path, cx));
    }

    fn new_chat(&mut self, _: &NewChat, _window: &mut Window, cx: &mut Context<Self>) {
        self.chat_state
            .update(cx, |state, cx| state.toggle(ConversationIndex::NEW, cx));
        self.open(CHAT_PATH, cx);
    }

    fn go_home(&mut self, _: &GoHome, _window: &mut Window, cx: &mut Context<Self>) {
        self.router.read(cx).navigator().open_window(HOME_PATH);
    }

    fn toggle_theme(&mut self, _: &ToggleTheme, _window: &mut Window, cx: &mut Context<Self>) {
        let next = (*self.settings_state.read(cx).settings())
            .clone()
            .with_toggled_theme();
        let result = self
            .settings_state
            .update(cx, |state, cx| state.update_settings(next, cx));
        if let Err(error) = result {
            report_unhandled("toggle theme", &error);
        }
    }

    /// Appends the draft and hands the outcome back to the input, which clears
    /// itself only when the store accepted the message.
    fn handle_submit(&mut self, event: Submit, window: &mut Window, cx: &mut Context<Self>) {
        let append = self.chat_state.read(cx).append_user_message(event.content);
        let task = Tokio::spawn(cx, append);

        cx.spawn_in(window, async move |this, cx| {
            let accepted = settle_reported("append message", task).await.is_some();
            let _ = this.update_in(cx, |shell, window, cx| {
                shell.message_input.update(cx, |input, cx| {
                    input.finish_submit(accepted, window, cx);
                });
                if accepted {
                    shell.open(CHAT_PATH, cx);
                }
            });
        })
        .detach();
    }
}

impl Render for ParleyShell {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let body = match self.route(cx) {
            Route::Home => self.render_home(cx),
            Route::Chat => self.render_chat(cx),
        };

        v_flex()
            .id("parley-shell")
            .size_full()
            .bg(theme.background)
            .on_action(cx.listener(Self::new_chat))
            .on_action(cx.listener(Self::go_home))
            .on_action(cx.listener(Self::toggle_theme))
            .child(self.render_top_bar(cx))
            .child(div().flex_1().min_h_0().child(body))
    }
}

impl ParleyShell {
    fn render_top_bar(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let (theme_icon, theme_tooltip) =
            if self.settings_state.read(cx).settings().theme_mode.is_dark() {
                (IconName::Sun, "Switch to light theme")
            } else {
                (IconName::Moon, "Switch to dark theme")
            };

        h_flex()
            .id("app-top-bar")
            .window_control_area(WindowControlArea::Drag)
            .on_mouse_down_out(cx.listener(|this, _, _window, _cx| {
                this.title_bar_should_move = false;
            }))
            .on_mouse_up(
                MouseButton::Left,
                cx.listener(|this, _, _window, _cx| {
                    this.title_bar_should_move = false;
                }),
            )
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, _, _window, _cx| {
                    this.title_bar_should_move = true;
                }),
            )
            .on_mouse_move(cx.listener(|this, _, window, _cx| {
                if this.title_bar_should_move {
                    this.title_bar_should_move = false;
                    window.start_window_move();
                }
            }))
            .w_full()
            .h(px(TOOLBAR_HEIGHT))
            .flex_shrink_0()
            .pl(px(WINDOW_TOOLBAR_LEFT_SAFE_PADDING))
            .pr_3()
            .gap_2()
            .items_center()
            .border_b_1()
            .border_color(theme.border)
            .child(
                div()
                    .flex_1()
                    .text_sm()
                    .font_weight(FontWeight::SEMIBOLD)
                    .text_color(theme.foreground)
                    .child("Parley"),
            )
            .child(
                Button::new("toggle-theme")
                    .ghost()
                    .small()
                    .icon(theme_icon)
                    .tooltip(theme_tooltip)
                    .on_click(cx.listener(|this, _, window, cx| {
                        this.toggle_theme(&ToggleTheme, window, cx);
                    })),
            )
            .child(self.project_link.clone())
    }

    fn render_home(&self, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();
        let conversation_count = self.chat_state.read(cx).conversations().len();
        let summary = match conversation_count {
            0 => "No saved conversations yet.".to_string(),
            1 => "1 saved conversation.".to_string(),
            count => format!("{count} saved conversations."),
        };

        v_flex()
            .id("home-page")
            .size_full()
            .items_center()
            .justify_center()
            .gap_3()
            .child(
                div()
                    .text_xl()
                    .font_weight(FontWeight::SEMIBOLD)
                    .text_color(theme.foreground)
                    .child("Welcome to Parley"),
            )
            .child(
                div()
                    .text_sm()
                    .text_color(theme.muted_foreground)
                    .child(summary),
            )
            .child(
                Button::new("home-start-chatting")
                    .primary()
                    .child("Start chatting")
                    .on_click(cx.listener(|this, _, _window, cx| {
                        this.open(CHAT_PATH, cx);
                    })),
            )
            .into_any_element()
    }

    fn render_chat(&self, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();

        h_flex()
            .id("chat-page")
            .size_full()
            .child(
                div()
                    .id("sidebar-container")
                    .h_full()
                    .w(px(SIDEBAR_WIDTH))
                    .flex_shrink_0()
                    .border_r_1()
                    .border_color(theme.border)
                    .child(self.sidebar.clone()),
            )
            .child(
                v_flex()
                    .id("main-content")
                    .flex_1()
                    .h_full()
                    .min_w_0()
                    .child(div().flex_1().min_h_0().child(self.message_list.clone()))
                    .child(self.message_input.clone()),
            )
            .into_any_element()
    }
}
