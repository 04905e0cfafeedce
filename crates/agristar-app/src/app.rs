//! Main egui application — composes the panels and drives the coordinator.

use std::future::Future;
use std::rc::Rc;

use egui::{self, CentralPanel, SidePanel};
use gloo_timers::callback::Interval;
use wasm_bindgen::prelude::*;

use agristar_core::event_bus::EventBus;
use agristar_core::ports::{ChatBackendPort, DictationPort, MediaPort, SpeechPort};
use agristar_core::ChatInputCoordinator;
use agristar_platform::{
    BrowserDictation, BrowserMediaRecorder, BrowserSpeech, HttpChatBackend, ImageSource,
    pick_image,
};
use agristar_types::Result;
use agristar_types::attachment::InputMode;
use agristar_types::config::FeatureFlags;
use agristar_ui::action::ChatAction;
use agristar_ui::panels::{chat, dialogs, history};
use agristar_ui::state::UiState;
use agristar_ui::theme;

use crate::page::PageConfig;

const SIDEBAR_WIDTH: f32 = 240.0;

/// The main application state
pub struct AgriStarApp {
    ui_state: UiState,
    event_bus: EventBus,
    coordinator: Rc<ChatInputCoordinator>,
    features: FeatureFlags,
    quick_tips: Vec<String>,
    accepted_images: Vec<String>,
    /// Repaints once a second so the recording timer advances
    recording_tick: Option<Interval>,
    first_frame: bool,
}

impl AgriStarApp {
    pub fn new(cc: &eframe::CreationContext<'_>, page: PageConfig) -> Self {
        let config = page.chat;
        let event_bus = EventBus::new();
        let ctx = cc.egui_ctx.clone();
        event_bus.set_wake_hook(move || ctx.request_repaint());

        let backend: Rc<dyn ChatBackendPort> = Rc::new(HttpChatBackend::new(config.clone()));
        let media: Rc<dyn MediaPort> = Rc::new(BrowserMediaRecorder::new());
        let speech: Option<Rc<dyn SpeechPort>> = if config.features.speak_replies {
            let speech = BrowserSpeech::new().map(|s| Rc::new(s) as Rc<dyn SpeechPort>);
            if speech.is_none() {
                log::warn!("Speech synthesis unavailable; replies will not be read aloud");
            }
            speech
        } else {
            None
        };

        let dictation: Option<Rc<dyn DictationPort>> = if config.features.dictation {
            let dictation = BrowserDictation::new().map(|d| Rc::new(d) as Rc<dyn DictationPort>);
            if dictation.is_none() {
                log::warn!("Speech recognition unavailable; hiding dictation");
            }
            dictation
        } else {
            None
        };

        let mut features = config.features;
        features.dictation &= dictation.is_some();
        let quick_tips = config.quick_tips.clone();
        let accepted_images = config.limits.allowed_image_types.clone();
        let mut coordinator =
            ChatInputCoordinator::new(config, event_bus.clone(), backend, media, speech);
        if let Some(dictation) = dictation {
            coordinator = coordinator.with_dictation(dictation);
        }
        let coordinator = Rc::new(coordinator);
        Self::teardown_on_pagehide(coordinator.clone());

        let app = Self {
            ui_state: UiState::new(),
            event_bus,
            coordinator,
            features,
            quick_tips,
            accepted_images,
            recording_tick: None,
            first_frame: true,
        };

        if features.history {
            app.spawn("refresh history", |c| async move { c.refresh_history().await });
        }
        if let Some(session_id) = page.initial_session {
            log::info!("Opening session {} from page", session_id);
            app.spawn("load session", move |c| async move { c.load_session(&session_id).await });
        }
        app
    }

    /// Release the microphone and object URLs when the page goes away.
    fn teardown_on_pagehide(coordinator: Rc<ChatInputCoordinator>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let on_hide = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
            coordinator.teardown();
        });
        if let Err(e) =
            window.add_event_listener_with_callback("pagehide", on_hide.as_ref().unchecked_ref())
        {
            log::warn!("Cannot watch pagehide: {:?}", e);
        }
        on_hide.forget();
    }

    /// Run a coordinator operation on the browser event loop. Failures are
    /// already surfaced to the user by the coordinator, so they are only logged.
    fn spawn<F, Fut>(&self, what: &'static str, op: F)
    where
        F: FnOnce(Rc<ChatInputCoordinator>) -> Fut + 'static,
        Fut: Future<Output = Result<()>> + 'static,
    {
        let coordinator = self.coordinator.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = op(coordinator).await {
                log::debug!("{} did not complete: {}", what, e);
            }
        });
    }

    fn dispatch(&mut self, action: ChatAction) {
        log::debug!("UI action: {:?}", action);
        match action {
            ChatAction::SendText(text) => {
                self.spawn("send text", move |c| async move { c.send_text(&text).await });
            }
            ChatAction::PickImage { camera } => {
                let source = if camera { ImageSource::Camera } else { ImageSource::Gallery };
                let accept = self.accepted_images.clone();
                self.spawn("pick image", move |c| async move {
                    match pick_image(source, &accept).await? {
                        Some(image) => c.stage_image(image),
                        None => Ok(()),
                    }
                });
            }
            ChatAction::ClearImage => report("clear image", self.coordinator.clear_image()),
            ChatAction::Dictate => {
                self.spawn("dictate", |c| async move { c.dictate().await });
            }
            ChatAction::StartRecording => {
                self.spawn("start recording", |c| async move { c.start_recording().await });
            }
            ChatAction::StopRecording => {
                self.spawn("stop recording", |c| async move { c.stop_recording().await });
            }
            ChatAction::DiscardAudio => report("discard audio", self.coordinator.discard_audio()),
            ChatAction::SendAudio => {
                self.spawn("send audio", |c| async move { c.send_audio().await });
            }
            ChatAction::SetLanguage(language) => self.coordinator.set_language(language),
            ChatAction::NewChat => self.coordinator.start_new_session(),
            ChatAction::LoadSession(id) => {
                self.spawn("load session", move |c| async move { c.load_session(&id).await });
            }
            ChatAction::RenameSession { session_id, title } => {
                self.spawn("rename session", move |c| async move {
                    c.rename_session(&session_id, &title).await
                });
            }
            ChatAction::DeleteSession(id) => {
                self.spawn("delete session", move |c| async move { c.delete_session(&id).await });
            }
        }
    }

    fn sync_recording_tick(&mut self, ctx: &egui::Context) {
        let recording = self.ui_state.mode == InputMode::Recording;
        match (recording, self.recording_tick.is_some()) {
            (true, false) => {
                let ctx = ctx.clone();
                self.recording_tick = Some(Interval::new(1_000, move || ctx.request_repaint()));
            }
            (false, true) => self.recording_tick = None,
            _ => {}
        }
    }
}

impl eframe::App for AgriStarApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.first_frame {
            theme::apply_theme(ctx);
            self.first_frame = false;
        }

        let now = ctx.input(|i| i.time);
        let now_ms = js_sys::Date::now() as i64;

        // Drain events from the coordinator
        if self.event_bus.has_pending() {
            self.ui_state.process_events(self.event_bus.drain(), now);
        }
        self.sync_recording_tick(ctx);

        let mut actions = Vec::new();

        if self.features.history {
            SidePanel::left("history_panel")
                .resizable(false)
                .exact_width(SIDEBAR_WIDTH)
                .frame(egui::Frame::default())
                .show(ctx, |ui| {
                    actions.extend(history::history_panel(ui, &mut self.ui_state));
                });
        }

        CentralPanel::default()
            .frame(egui::Frame::default())
            .show(ctx, |ui| {
                actions.extend(chat::chat_panel(
                    ui,
                    &mut self.ui_state,
                    &self.features,
                    &self.quick_tips,
                    now_ms,
                ));
            });

        actions.extend(dialogs::overlays(ctx, &mut self.ui_state, now));

        for action in actions {
            self.dispatch(action);
        }
    }
}

fn report(what: &str, result: Result<()>) {
    if let Err(e) = result {
        log::debug!("{} rejected: {}", what, e);
    }
}
