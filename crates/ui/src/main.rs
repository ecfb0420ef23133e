use std::sync::Arc;

use gpui::*;
use gpui_component::Root;
use parley_storage::{ConversationStore, MemoryConversationStore};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use parley::app::{GoHome, NewChat, ParleyShell, Quit, ToggleTheme, report_unhandled};
use parley::settings::{AppSettings, SettingsState, SettingsStore};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Opens the persisted store, falling back to a memory-only one if the snapshot is unusable.
fn open_store(settings: &AppSettings) -> Arc<dyn ConversationStore> {
    let path = settings.snapshot_path();
    match MemoryConversationStore::open(&path) {
        Ok(store) if settings.restore_last_conversation => Arc::new(store),
        Ok(store) => Arc::new(store.forget_active()),
        Err(error) => {
            report_unhandled("open conversation store", &error);
            tracing::warn!("conversations will not be saved this session");
            Arc::new(MemoryConversationStore::new())
        }
    }
}

fn main() {
    init_tracing();

    let settings_store = SettingsStore::load();
    let settings = settings_store.settings();
    let store = open_store(&settings);

    let app = Application::new().with_assets(gpui_component_assets::Assets);

    app.run(move |cx| {
        gpui_tokio_bridge::init(cx);

        // Required before any Root usage.
        gpui_component::init(cx);
        settings.apply_theme(None, cx);

        let settings_state = SettingsState::new(settings_store, cx);

        cx.on_action(|_: &Quit, cx| {
            cx.quit();
        });

        cx.bind_keys([
            KeyBinding::new("cmd-q", Quit, None),
            KeyBinding::new("cmd-n", NewChat, None),
            KeyBinding::new("cmd-shift-h", GoHome, None),
            KeyBinding::new("cmd-shift-t", ToggleTheme, None),
        ]);

        cx.spawn(async move |cx| {
            cx.update(|cx| {
                let options = WindowOptions {
                    window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                        None,
                        size(px(1000.), px(720.)),
                        cx,
                    ))),
                    titlebar: Some(TitlebarOptions {
                        appears_transparent: true,
                        traffic_light_position: Some(point(px(9.), px(9.))),
                        ..Default::default()
                    }),
                    ..Default::default()
                };

                let opened = cx.open_window(options, |window, cx| {
                    let shell =
                        cx.new(|cx| ParleyShell::new(store, settings_state, window, cx));
                    cx.new(|cx| Root::new(shell, window, cx))
                });
                if let Err(error) = opened {
                    report_unhandled("open main window", &error);
                    cx.quit();
                    return;
                }

                cx.activate(true);
            })
        })
        .detach();
    });
}
