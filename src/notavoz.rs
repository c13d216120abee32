use std::sync::Arc;

use anyhow::{Context, Result};
use arboard::Clipboard;
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use parking_lot::{Mutex, RwLock};
use tao::event::{ElementState, Event, StartCause, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder};
use tao::keyboard::Key;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tray_icon::menu::{AboutMetadataBuilder, Menu, MenuEvent, MenuItem, PredefinedMenuItem};
use tray_icon::{TrayIconBuilder, TrayIconEvent};

use notavoz::config_ext::ConfigExt;
use notavoz::dialog::WindowShell;
use notavoz::event::NotavozEvent;
use notavoz::notify::{NotificationLayer, SystemNotifier};
use notavoz::{
    icon, store, CaptureState, CloudEngine, Config, ConfigManager, EventSink, NoteCallback,
    NoteComposer, RecognitionEngine, RecognitionSettings, WhisperApiClient, WhisperApiConfig,
    DEFAULT_LOG_LEVEL, VERSION,
};

fn main() -> Result<()> {
    // Initialize the logger
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("NOTAVOZ_LOG")
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL)),
        )
        .finish()
        .with(NotificationLayer::new())
        .init();

    // Load config
    let config_manager = ConfigManager::new()?;
    let config = Arc::new(RwLock::new(config_manager.load()?));
    // save back the config to create the file if it doesn't exist
    config_manager.save(&config.read())?;

    // Set up hotkey
    let hotkey_manager = GlobalHotKeyManager::new().context("Failed to create hotkey manager")?;
    let hotkey = config.read().hotkey();
    hotkey_manager
        .register(hotkey)
        .context("Failed to register hotkey")?;

    // Clipboard for the "copy config path" tray item
    let mut clipboard = Clipboard::new()?;

    // Recognition engines, probed in order when a recording starts
    let engines = build_engines(&config.read())?;

    // Where saved notes land; the composer only ever sees the callback
    let notes_path = match config.read().notes_path() {
        Some(path) => path.to_owned(),
        None => store::default_notes_path()?,
    };
    info!(notes_path = ?notes_path, "notes will be appended here");

    // Create the tray menu
    let tray_menu = Menu::new();
    let item_new_note = MenuItem::new("New note", true, None);
    let item_copy_config = MenuItem::new("Copy config path", true, None);
    let item_quit = MenuItem::new("Quit", true, None);
    tray_menu.append_items(&[
        // the name of the app
        &MenuItem::new("NotaVoz", false, None),
        &PredefinedMenuItem::separator(),
        &item_new_note,
        &PredefinedMenuItem::about(
            None,
            Some(
                AboutMetadataBuilder::new()
                    .version(Some(VERSION.to_owned()))
                    .build(),
            ),
        ),
        &item_copy_config,
        &PredefinedMenuItem::separator(),
        &item_quit,
    ])?;

    // Set up the event loop
    let mut icon_tray = None;

    let menu_channel = MenuEvent::receiver();
    let tray_channel = TrayIconEvent::receiver();
    let hotkey_channel = GlobalHotKeyEvent::receiver();

    let event_loop: EventLoop<NotavozEvent> = EventLoopBuilder::with_user_event().build();
    let event_sender = event_loop.create_proxy();

    // Session events come back through the loop so the composer applies
    // them on the UI thread, never concurrently with input handling.
    let recognition_proxy = Mutex::new(event_loop.create_proxy());
    let sink: EventSink = Arc::new(move |recognition_event| {
        recognition_proxy
            .lock()
            .send_event(NotavozEvent::Recognition(recognition_event))
            .ok();
    });

    let callback_path = notes_path.clone();
    let on_note_created: NoteCallback = Box::new(move |content| {
        if let Err(e) = store::append_note(&callback_path, content) {
            error!("failed to persist note: {:?}", e);
        }
    });

    let settings = match config.read().language() {
        Some(language) => RecognitionSettings::default().with_language(language),
        None => RecognitionSettings::default(),
    };

    let mut composer = NoteComposer::new(
        engines,
        Box::new(SystemNotifier),
        sink,
        on_note_created,
    )
    .with_settings(settings);

    let mut shell = WindowShell::new();

    event_loop.run(move |event, target, control_flow| {
        *control_flow = ControlFlow::Wait;

        if let Event::NewEvents(StartCause::Init) = event {
            // We create the icon once the event loop is actually running
            // to prevent issues like https://github.com/tauri-apps/tray-icon/issues/90

            icon_tray.replace(
                TrayIconBuilder::new()
                    .with_menu(Box::new(tray_menu.clone()))
                    .with_tooltip("notavoz - voice notes")
                    .with_icon(icon::tray_icon(CaptureState::Idle))
                    .build()
                    .unwrap(),
            );

            // We have to request a redraw here to have the icon actually show up.
            // Tao only exposes a redraw method on the Window so we use core-foundation directly.
            #[cfg(target_os = "macos")]
            unsafe {
                use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};

                let rl = CFRunLoopGetMain();
                CFRunLoopWakeUp(rl);
            }

            info!("NotaVoz ready");
        }

        if let Ok(menu_event) = menu_channel.try_recv() {
            if menu_event.id == item_quit.id() {
                icon_tray.take();
                *control_flow = ControlFlow::Exit;
            } else if menu_event.id == item_copy_config.id() {
                if let Err(e) =
                    clipboard.set_text(config_manager.config_path().to_string_lossy().into_owned())
                {
                    error!("Failed to copy config path to clipboard: {}", e);
                }
            } else if menu_event.id == item_new_note.id() {
                if let Err(e) = shell.open(target) {
                    error!("Failed to open note dialog: {:?}", e);
                }
                shell.set_title(&composer_title(&composer));
            }
        }

        #[expect(clippy::redundant_pattern_matching)]
        if let Ok(_) = tray_channel.try_recv() {
            // Handle tray icon events
        }

        // Dialog shell events: close affordance, outside interaction,
        // and keystrokes into the draft
        if let Event::WindowEvent {
            window_id,
            event: window_event,
            ..
        } = &event
        {
            if shell.owns(*window_id) {
                match window_event {
                    WindowEvent::CloseRequested => shell.close(),
                    // Losing focus is the overlay's click-outside
                    WindowEvent::Focused(false) => shell.close(),
                    WindowEvent::KeyboardInput { event: key, .. }
                        if key.state == ElementState::Pressed =>
                    {
                        handle_key(&mut composer, &key.logical_key);
                        shell.set_title(&composer_title(&composer));
                        event_sender
                            .send_event(NotavozEvent::StateChanged(capture_state(&composer)))
                            .ok();
                    }
                    _ => {}
                }
            }
        }

        // Handle user provided events
        if let Event::UserEvent(user_event) = event {
            match user_event {
                NotavozEvent::StateChanged(state) => {
                    info!(state = %state, "State changed");
                    icon_tray
                        .as_ref()
                        .map(|i| i.set_icon(Some(icon::tray_icon(state))));
                }
                NotavozEvent::Recognition(recognition_event) => {
                    composer.handle_recognition_event(recognition_event);
                    shell.set_title(&composer_title(&composer));
                }
            };
        }

        // Handle hotkey events: open the dialog when closed, start
        // dictating when open and idle, stop when recording
        if let Ok(hotkey_event) = hotkey_channel.try_recv() {
            if hotkey_event.id() == hotkey.id() && hotkey_event.state() == HotKeyState::Pressed {
                if !shell.is_open() {
                    if let Err(e) = shell.open(target) {
                        error!("Failed to open note dialog: {:?}", e);
                    }
                } else if !composer.is_recording() {
                    composer.start_recording();
                } else {
                    composer.stop_recording();
                }
                shell.set_title(&composer_title(&composer));
                event_sender
                    .send_event(NotavozEvent::StateChanged(capture_state(&composer)))
                    .ok();
            }
        }
    });
}

fn build_engines(config: &Config) -> Result<Vec<Arc<dyn RecognitionEngine>>> {
    let api = config.api_key().map(|key| {
        let mut api_config = WhisperApiConfig::new(key);
        if let Some(model) = config.model() {
            api_config = api_config.with_model(model);
        }
        WhisperApiClient::new(api_config)
    });

    let engine = CloudEngine::new(api, config.window())?;
    Ok(vec![Arc::new(engine) as Arc<dyn RecognitionEngine>])
}

fn capture_state(composer: &NoteComposer) -> CaptureState {
    if composer.is_recording() {
        CaptureState::Recording
    } else {
        CaptureState::Idle
    }
}

fn composer_title(composer: &NoteComposer) -> String {
    if composer.is_recording() {
        if composer.draft().is_empty() {
            "listening...".to_owned()
        } else {
            format!("listening: {}", composer.draft())
        }
    } else if composer.onboarding_visible() {
        "new note: dictate with the hotkey, or just start typing".to_owned()
    } else {
        format!("new note: {}", composer.draft())
    }
}

/// Route one keystroke from the dialog into the composer. Enter is the
/// record-toggle/submit affordance and never reaches the draft.
fn handle_key(composer: &mut NoteComposer, key: &Key) {
    match key {
        Key::Enter => {
            if composer.is_recording() {
                composer.stop_recording();
            } else {
                composer.save();
            }
        }
        Key::Backspace => {
            let mut text = composer.draft().to_owned();
            text.pop();
            composer.content_changed(&text);
        }
        Key::Space => insert_text(composer, " "),
        Key::Character(s) => insert_text(composer, s),
        _ => {}
    }
}

fn insert_text(composer: &mut NoteComposer, s: &str) {
    // Typing from the prompt is the "switch to text" choice
    if composer.onboarding_visible() {
        composer.open_editor();
    }
    let mut text = composer.draft().to_owned();
    text.push_str(s);
    composer.content_changed(&text);
}
