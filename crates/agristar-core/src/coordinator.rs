//! Chat input coordinator — owns the conversation and the input mode.
//!
//! Tracks one active session, one input mode (text / staged image /
//! recording / audio review) and mediates between the UI and the four
//! backend endpoints (text, vision, voice, history).
//!
//! All state sits behind a `RefCell` that is released before every `.await`,
//! so the coordinator can be shared as `Rc<ChatInputCoordinator>` and driven
//! from `wasm_bindgen_futures::spawn_local` tasks.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};

use agristar_types::{
    ChatError, Result,
    attachment::{AudioClip, ImageFile, InputMode, PendingAttachment},
    config::ChatConfig,
    event::{ChatEvent, NoticeLevel},
    language::Language,
    message::Message,
    session::{HistoryEntry, SessionHistory, SessionRef},
    wire::{AudioChatRequest, ChatReply, TextChatRequest, VisionChatRequest},
};

use crate::event_bus::EventBus;
use crate::ports::{ChatBackendPort, DictationPort, MediaPort, SpeechPort};
use crate::sequence::{RequestSequencer, Ticket};

const LOADED_SESSION_TITLE: &str = "Conversation";
const DICTATION_UNSUPPORTED: &str = "Voice input not supported in this browser";

/// Input state; the attachment lives inside the variant so at most one can exist.
#[derive(Debug, Clone)]
enum InputState {
    Idle,
    ImageStaged(ImageFile),
    Recording { started_at: DateTime<Utc> },
    AudioReview(AudioClip),
}

impl InputState {
    fn mode(&self) -> InputMode {
        match self {
            InputState::Idle => InputMode::Idle,
            InputState::ImageStaged(_) => InputMode::ImageStaged,
            InputState::Recording { .. } => InputMode::Recording,
            InputState::AudioReview(_) => InputMode::AudioReview,
        }
    }

    fn attachment(&self) -> Option<PendingAttachment> {
        match self {
            InputState::ImageStaged(img) => Some(PendingAttachment::Image(img.clone())),
            InputState::AudioReview(clip) => Some(PendingAttachment::Audio(clip.clone())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RequestKind {
    Text,
    Vision,
    Audio,
}

enum Outbound {
    Text(TextChatRequest),
    Vision(VisionChatRequest),
    Audio(AudioChatRequest),
}

struct InFlight {
    ticket: Ticket,
    typing_id: String,
    kind: RequestKind,
    language: Language,
}

struct Completion {
    result: Result<ChatReply>,
    kind: RequestKind,
    language: Language,
}

struct ChatState {
    session: Option<SessionRef>,
    transcript: Vec<Message>,
    history: SessionHistory,
    input: InputState,
    language: Language,
    sequencer: RequestSequencer<Completion>,
    in_flight: Option<InFlight>,
    /// Session id whose history is being fetched
    loading: Option<String>,
    /// Microphone prompt is open
    recording_requested: bool,
    /// stop_recording is finalizing the clip
    stop_requested: bool,
    /// Speech recognition is filling the input field
    dictating: bool,
}

/// One instance per page view. Construct, share via `Rc`, call `teardown`
/// on navigation.
pub struct ChatInputCoordinator {
    config: ChatConfig,
    bus: EventBus,
    backend: Rc<dyn ChatBackendPort>,
    media: Rc<dyn MediaPort>,
    speech: Option<Rc<dyn SpeechPort>>,
    dictation: Option<Rc<dyn DictationPort>>,
    state: RefCell<ChatState>,
}

impl ChatInputCoordinator {
    pub fn new(
        config: ChatConfig,
        bus: EventBus,
        backend: Rc<dyn ChatBackendPort>,
        media: Rc<dyn MediaPort>,
        speech: Option<Rc<dyn SpeechPort>>,
    ) -> Self {
        let greeting = vec![Message::bot(&config.greeting)];
        let state = ChatState {
            session: None,
            transcript: greeting.clone(),
            history: SessionHistory::new(),
            input: InputState::Idle,
            language: config.language,
            sequencer: RequestSequencer::new(),
            in_flight: None,
            loading: None,
            recording_requested: false,
            stop_requested: false,
            dictating: false,
        };

        bus.emit(ChatEvent::TranscriptReplaced { messages: greeting });
        bus.emit(ChatEvent::LanguageChanged { language: config.language });

        Self {
            config,
            bus,
            backend,
            media,
            speech,
            dictation: None,
            state: RefCell::new(state),
        }
    }

    /// Attach a speech-to-text adapter. Without one, `dictate` alerts that
    /// voice input is unsupported.
    pub fn with_dictation(mut self, dictation: Rc<dyn DictationPort>) -> Self {
        self.dictation = Some(dictation);
        self
    }

    // ─── Read access ─────────────────────────────────────────

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn mode(&self) -> InputMode {
        self.state.borrow().input.mode()
    }

    pub fn pending_attachment(&self) -> Option<PendingAttachment> {
        self.state.borrow().input.attachment()
    }

    pub fn session(&self) -> Option<SessionRef> {
        self.state.borrow().session.clone()
    }

    pub fn session_id(&self) -> Option<String> {
        self.state.borrow().session.as_ref().map(|s| s.id.clone())
    }

    pub fn transcript(&self) -> Vec<Message> {
        self.state.borrow().transcript.clone()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.state.borrow().history.entries().to_vec()
    }

    pub fn language(&self) -> Language {
        self.state.borrow().language
    }

    /// A chat request or a history load is outstanding.
    pub fn is_busy(&self) -> bool {
        let st = self.state.borrow();
        st.in_flight.is_some() || st.loading.is_some()
    }

    pub fn is_dictating(&self) -> bool {
        self.state.borrow().dictating
    }

    /// Whole seconds since recording began, `None` unless recording.
    pub fn recording_elapsed(&self, now: DateTime<Utc>) -> Option<u64> {
        match self.state.borrow().input {
            InputState::Recording { started_at } => {
                Some((now - started_at).num_seconds().max(0) as u64)
            }
            _ => None,
        }
    }

    // ─── Settings ────────────────────────────────────────────

    pub fn set_language(&self, language: Language) {
        let mut st = self.state.borrow_mut();
        if st.language != language {
            st.language = language;
            self.bus.emit(ChatEvent::LanguageChanged { language });
        }
    }

    /// Seed the sidebar, e.g. from server-rendered markup.
    pub fn set_history(&self, entries: Vec<HistoryEntry>) {
        let mut st = self.state.borrow_mut();
        st.history.replace_all(entries);
        self.bus.emit(ChatEvent::HistoryChanged {
            entries: st.history.entries().to_vec(),
        });
    }

    // ─── Image staging ───────────────────────────────────────

    /// `Idle`/`ImageStaged` → `ImageStaged`. Oversized or unsupported files
    /// are rejected with a blocking alert and leave the mode untouched.
    pub fn stage_image(&self, image: ImageFile) -> Result<()> {
        if !self.config.features.image {
            self.media.release_preview(&image.preview_url);
            return Err(ChatError::Config("image upload is disabled".to_string()));
        }

        let mut st = self.state.borrow_mut();
        if !matches!(st.input, InputState::Idle | InputState::ImageStaged(_)) {
            self.media.release_preview(&image.preview_url);
            return Err(ChatError::InvalidState(st.input.mode().label().to_string()));
        }

        if let Err(e) = image.validate(&self.config.limits) {
            log::info!("Rejected image {} ({} bytes): {}", image.name, image.size(), e);
            self.media.release_preview(&image.preview_url);
            self.bus.emit(ChatEvent::Alert { message: e.to_string() });
            return Err(e);
        }

        if let InputState::ImageStaged(old) =
            std::mem::replace(&mut st.input, InputState::ImageStaged(image))
        {
            self.media.release_preview(&old.preview_url);
        }
        self.emit_mode(&st);
        Ok(())
    }

    /// `ImageStaged` → `Idle`. No-op when nothing is staged.
    pub fn clear_image(&self) -> Result<()> {
        let mut st = self.state.borrow_mut();
        match &st.input {
            InputState::Idle => Ok(()),
            InputState::ImageStaged(_) => {
                self.reset_input(&mut st);
                Ok(())
            }
            other => Err(ChatError::InvalidState(other.mode().label().to_string())),
        }
    }

    // ─── Recording ───────────────────────────────────────────

    /// `Idle` → `Recording`. A refused microphone raises a blocking alert
    /// and stays `Idle`.
    pub async fn start_recording(&self) -> Result<()> {
        if !self.config.features.voice {
            return Err(ChatError::Config("voice input is disabled".to_string()));
        }
        {
            let mut st = self.state.borrow_mut();
            if st.dictating {
                return Err(ChatError::InvalidState("listening".to_string()));
            }
            if !matches!(st.input, InputState::Idle) || st.recording_requested {
                return Err(ChatError::InvalidState(st.input.mode().label().to_string()));
            }
            st.recording_requested = true;
        }

        let result = self.media.start_recording().await;

        let mut st = self.state.borrow_mut();
        let still_wanted = st.recording_requested && matches!(st.input, InputState::Idle);
        st.recording_requested = false;

        match result {
            Err(e) => {
                log::warn!("Microphone unavailable: {}", e);
                self.bus.emit(ChatEvent::Alert { message: e.to_string() });
                Err(e)
            }
            Ok(()) if !still_wanted => {
                log::debug!("Recording started after input was reset; cancelling");
                self.media.cancel_recording();
                Err(ChatError::Cancelled)
            }
            Ok(()) => {
                let started_at = Utc::now();
                st.input = InputState::Recording { started_at };
                log::info!("Recording started");
                self.emit_mode(&st);
                self.bus.emit(ChatEvent::RecordingStarted {
                    started_at_ms: started_at.timestamp_millis(),
                });
                Ok(())
            }
        }
    }

    /// `Recording` → `AudioReview`.
    pub async fn stop_recording(&self) -> Result<()> {
        {
            let mut st = self.state.borrow_mut();
            if !matches!(st.input, InputState::Recording { .. }) || st.stop_requested {
                return Err(ChatError::InvalidState(st.input.mode().label().to_string()));
            }
            st.stop_requested = true;
        }

        let result = self.media.stop_recording().await;

        let mut st = self.state.borrow_mut();
        let still_recording = st.stop_requested && matches!(st.input, InputState::Recording { .. });
        st.stop_requested = false;

        if !still_recording {
            if let Ok(clip) = result {
                self.media.release_preview(&clip.preview_url);
            }
            return Err(ChatError::Cancelled);
        }

        match result {
            Ok(clip) => {
                log::info!("Recording finished ({} bytes)", clip.bytes.len());
                st.input = InputState::AudioReview(clip);
                self.emit_mode(&st);
                Ok(())
            }
            Err(e) => {
                log::warn!("Failed to finalize recording: {}", e);
                st.input = InputState::Idle;
                self.emit_mode(&st);
                self.bus.emit(ChatEvent::Alert { message: e.to_string() });
                Err(e)
            }
        }
    }

    /// `AudioReview` → `Idle`, releasing the clip and its preview.
    pub fn discard_audio(&self) -> Result<()> {
        let mut st = self.state.borrow_mut();
        match &st.input {
            InputState::AudioReview(_) => {
                self.reset_input(&mut st);
                Ok(())
            }
            other => Err(ChatError::InvalidState(other.mode().label().to_string())),
        }
    }

    // ─── Dictation ───────────────────────────────────────────

    /// Listen for a spoken question and hand the words to the input field.
    /// Calling it again while listening stops early and keeps what was heard.
    pub async fn dictate(&self) -> Result<()> {
        if !self.config.features.dictation {
            return Err(ChatError::Config("dictation is disabled".to_string()));
        }
        let Some(port) = self.dictation.clone() else {
            self.bus.emit(ChatEvent::Alert {
                message: DICTATION_UNSUPPORTED.to_string(),
            });
            return Err(ChatError::Config(DICTATION_UNSUPPORTED.to_string()));
        };

        let language = {
            let mut st = self.state.borrow_mut();
            if st.dictating {
                log::debug!("Dictation stopped by the user");
                port.stop();
                return Ok(());
            }
            if !matches!(st.input, InputState::Idle | InputState::ImageStaged(_))
                || st.recording_requested
            {
                return Err(ChatError::InvalidState(st.input.mode().label().to_string()));
            }
            st.dictating = true;
            st.language
        };
        self.bus.emit(ChatEvent::DictationStarted { language });

        let result = port.listen(language).await;

        let still_wanted = std::mem::replace(&mut self.state.borrow_mut().dictating, false);
        if !still_wanted {
            log::debug!("Dictation result arrived after it was cancelled");
            return Err(ChatError::Cancelled);
        }

        match result {
            Ok(transcript) => {
                let transcript = transcript
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty());
                log::info!("Dictation finished ({})", if transcript.is_some() { "heard" } else { "silent" });
                self.bus.emit(ChatEvent::DictationFinished { transcript });
                Ok(())
            }
            Err(ChatError::Cancelled) => {
                self.bus.emit(ChatEvent::DictationFinished { transcript: None });
                Err(ChatError::Cancelled)
            }
            Err(e) => {
                log::warn!("Speech recognition failed: {}", e);
                self.bus.emit(ChatEvent::DictationFailed { message: e.to_string() });
                Err(e)
            }
        }
    }

    // ─── Sending ─────────────────────────────────────────────

    /// Send typed text, or the staged image with the text as its prompt.
    /// Empty text with nothing staged is ignored.
    pub async fn send_text(&self, text: &str) -> Result<()> {
        let text = text.trim();

        let (ticket, outbound) = {
            let mut st = self.state.borrow_mut();
            let has_image = matches!(st.input, InputState::ImageStaged(_));
            if text.is_empty() && !has_image {
                log::debug!("Ignoring empty send");
                return Ok(());
            }
            if !matches!(st.input, InputState::Idle | InputState::ImageStaged(_)) {
                return Err(ChatError::InvalidState(st.input.mode().label().to_string()));
            }
            self.ensure_not_busy(&st)?;

            let language = if self.config.features.detect_language && !text.is_empty() {
                Language::detect(text)
            } else {
                st.language
            };
            let session_id = st.session.as_ref().map(|s| s.id.clone());

            if !text.is_empty() {
                self.append(&mut st, Message::user(text));
            }

            let outbound = match std::mem::replace(&mut st.input, InputState::Idle) {
                InputState::ImageStaged(image) => {
                    self.append(&mut st, Message::user_image(&image.preview_url));
                    self.emit_mode(&st);
                    let message = if text.is_empty() {
                        self.config.default_image_prompt.clone()
                    } else {
                        text.to_string()
                    };
                    Outbound::Vision(VisionChatRequest { image, message, language, session_id })
                }
                _ => Outbound::Text(TextChatRequest {
                    message: text.to_string(),
                    language,
                    session_id,
                }),
            };

            let kind = match &outbound {
                Outbound::Vision(_) => RequestKind::Vision,
                _ => RequestKind::Text,
            };
            (self.begin_request(&mut st, kind, language), outbound)
        };

        self.dispatch(ticket, outbound).await
    }

    /// Send the reviewed recording. The attachment is cleared as soon as the
    /// request goes out; a failed upload is not retried.
    pub async fn send_audio(&self) -> Result<()> {
        let (ticket, outbound) = {
            let mut st = self.state.borrow_mut();
            self.ensure_not_busy(&st)?;
            let clip = match std::mem::replace(&mut st.input, InputState::Idle) {
                InputState::AudioReview(clip) => clip,
                other => {
                    let mode = other.mode();
                    st.input = other;
                    return Err(ChatError::InvalidState(mode.label().to_string()));
                }
            };
            self.emit_mode(&st);
            self.append(&mut st, Message::user_audio(&clip.preview_url));

            let language = st.language;
            let session_id = st.session.as_ref().map(|s| s.id.clone());
            let ticket = self.begin_request(&mut st, RequestKind::Audio, language);
            (ticket, Outbound::Audio(AudioChatRequest { clip, language, session_id }))
        };

        self.dispatch(ticket, outbound).await
    }

    async fn dispatch(&self, ticket: Ticket, outbound: Outbound) -> Result<()> {
        let result = match outbound {
            Outbound::Text(req) => self.backend.send_text(req).await,
            Outbound::Vision(req) => self.backend.send_image(req).await,
            Outbound::Audio(req) => self.backend.send_audio(req).await,
        };
        self.finish_request(ticket, result)
    }

    fn ensure_not_busy(&self, st: &ChatState) -> Result<()> {
        if st.in_flight.is_some() || st.loading.is_some() {
            return Err(ChatError::Busy);
        }
        Ok(())
    }

    fn begin_request(&self, st: &mut ChatState, kind: RequestKind, language: Language) -> Ticket {
        let typing = Message::typing();
        let typing_id = typing.local_id.clone();
        self.append(st, typing);

        let ticket = st.sequencer.issue();
        st.in_flight = Some(InFlight { ticket, typing_id, kind, language });
        self.bus.emit(ChatEvent::RequestStarted { language });
        ticket
    }

    fn finish_request(&self, ticket: Ticket, result: Result<ChatReply>) -> Result<()> {
        let mut st = self.state.borrow_mut();
        if !st.sequencer.is_current(ticket) {
            log::debug!("Discarding response for an abandoned conversation");
            return Err(ChatError::Cancelled);
        }

        let flight = match st.in_flight.take() {
            Some(flight) if flight.ticket == ticket => flight,
            other => {
                st.in_flight = other;
                log::warn!("Response for seq {} does not match the in-flight request", ticket.seq);
                return Err(ChatError::Cancelled);
            }
        };
        self.remove_message(&mut st, &flight.typing_id);

        let ready = st.sequencer.complete(
            ticket,
            Completion {
                result,
                kind: flight.kind,
                language: flight.language,
            },
        );
        let mut outcome = Ok(());
        for completion in ready {
            outcome = self.apply_completion(&mut st, completion);
        }
        self.bus.emit(ChatEvent::RequestFinished { success: outcome.is_ok() });
        outcome
    }

    fn apply_completion(&self, st: &mut ChatState, completion: Completion) -> Result<()> {
        match completion.result {
            Ok(reply) => {
                self.append(st, Message::bot(&reply.response));
                if let Some(id) = reply.session_id {
                    self.adopt_session(st, id, reply.session_title);
                }
                if self.config.features.speak_replies {
                    if let Some(speech) = &self.speech {
                        speech.speak(&reply.response, completion.language);
                    }
                }
                Ok(())
            }
            Err(e) => {
                log::warn!("Chat request failed: {}", e);
                self.append(st, Message::bot_error(failure_text(&e, completion.kind)));
                Err(e)
            }
        }
    }

    /// Make `id` the current session, adding one sidebar entry if it is new.
    fn adopt_session(&self, st: &mut ChatState, id: String, title: Option<String>) {
        if st.session.as_ref().is_some_and(|s| s.id == id) {
            return;
        }
        let known_title = st.history.get(&id).map(|e| e.title.clone());
        let session = SessionRef::new(id, title.as_deref().or(known_title.as_deref()));

        let inserted = st.history.insert_front(HistoryEntry {
            id: session.id.clone(),
            title: session.title.clone(),
            message_count: None,
        });
        if inserted {
            self.bus.emit(ChatEvent::HistoryChanged {
                entries: st.history.entries().to_vec(),
            });
        }

        log::info!("Active session is now {}", session.id);
        st.session = Some(session.clone());
        self.bus.emit(ChatEvent::SessionChanged { session: Some(session) });
    }

    // ─── Sessions ────────────────────────────────────────────

    /// Replace the transcript with a stored session. On failure the current
    /// session and transcript are left as they were.
    pub async fn load_session(&self, session_id: &str) -> Result<()> {
        let generation = {
            let mut st = self.state.borrow_mut();
            self.abandon_in_flight(&mut st);
            self.reset_input(&mut st);
            self.cancel_dictation(&mut st);
            st.loading = Some(session_id.to_string());
            self.bus.emit(ChatEvent::LoadStarted {
                session_id: session_id.to_string(),
            });
            st.sequencer.generation()
        };
        log::info!("Loading session {}", session_id);

        let result = self.backend.fetch_history(session_id).await;

        let mut st = self.state.borrow_mut();
        if st.sequencer.generation() != generation || st.loading.as_deref() != Some(session_id) {
            log::debug!("Load of session {} superseded", session_id);
            return Err(ChatError::Cancelled);
        }
        st.loading = None;

        match result {
            Ok(messages) => {
                let title = st
                    .history
                    .get(session_id)
                    .map(|e| e.title.clone())
                    .unwrap_or_else(|| LOADED_SESSION_TITLE.to_string());
                self.replace_transcript(&mut st, messages);
                let session = SessionRef {
                    id: session_id.to_string(),
                    title,
                };
                st.session = Some(session.clone());
                self.bus.emit(ChatEvent::SessionChanged { session: Some(session) });
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load session {}: {}", session_id, e);
                let message = match &e {
                    ChatError::Network(_) => "Network Error",
                    _ => "Failed to load history",
                };
                self.bus.emit(ChatEvent::LoadFailed {
                    session_id: session_id.to_string(),
                    message: message.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Forget the current session and show only the greeting.
    pub fn start_new_session(&self) {
        let mut st = self.state.borrow_mut();
        self.abandon_in_flight(&mut st);
        self.reset_input(&mut st);
        self.cancel_dictation(&mut st);
        st.loading = None;
        st.session = None;
        let greeting = vec![Message::bot(&self.config.greeting)];
        self.replace_transcript(&mut st, greeting);
        self.bus.emit(ChatEvent::SessionChanged { session: None });
    }

    pub async fn rename_session(&self, session_id: &str, title: &str) -> Result<()> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(());
        }

        match self.backend.rename_session(session_id, title).await {
            Ok(stored) => {
                let stored = if stored.trim().is_empty() { title.to_string() } else { stored };
                let mut st = self.state.borrow_mut();
                if st.history.rename(session_id, &stored) {
                    self.bus.emit(ChatEvent::HistoryChanged {
                        entries: st.history.entries().to_vec(),
                    });
                }
                if let Some(session) = st.session.as_mut().filter(|s| s.id == session_id) {
                    session.title = stored;
                    let session = session.clone();
                    self.bus.emit(ChatEvent::SessionChanged { session: Some(session) });
                }
                Ok(())
            }
            Err(e) => {
                log::error!("Rename of session {} failed: {}", session_id, e);
                self.bus.emit(ChatEvent::Notice {
                    level: NoticeLevel::Error,
                    message: "Could not rename the chat. Please try again.".to_string(),
                });
                Err(e)
            }
        }
    }

    /// Deleting the active session starts a new one.
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        match self.backend.delete_session(session_id).await {
            Ok(()) => {
                let was_active = {
                    let mut st = self.state.borrow_mut();
                    if st.history.remove(session_id) {
                        self.bus.emit(ChatEvent::HistoryChanged {
                            entries: st.history.entries().to_vec(),
                        });
                    }
                    st.session.as_ref().is_some_and(|s| s.id == session_id)
                };
                if was_active {
                    self.start_new_session();
                }
                Ok(())
            }
            Err(e) => {
                log::error!("Delete of session {} failed: {}", session_id, e);
                self.bus.emit(ChatEvent::Notice {
                    level: NoticeLevel::Error,
                    message: "Could not delete the chat. Please try again.".to_string(),
                });
                Err(e)
            }
        }
    }

    /// Reload the sidebar from the server.
    pub async fn refresh_history(&self) -> Result<()> {
        if !self.config.features.history {
            return Ok(());
        }
        match self.backend.list_sessions().await {
            Ok(entries) => {
                self.set_history(entries);
                Ok(())
            }
            Err(e) => {
                log::warn!("Failed to load history list: {}", e);
                self.bus.emit(ChatEvent::Notice {
                    level: NoticeLevel::Error,
                    message: "Could not load your chat history.".to_string(),
                });
                Err(e)
            }
        }
    }

    /// Release everything held for this page view.
    pub fn teardown(&self) {
        let mut st = self.state.borrow_mut();
        self.abandon_in_flight(&mut st);
        self.reset_input(&mut st);
        self.cancel_dictation(&mut st);
        st.loading = None;
        if let Some(speech) = &self.speech {
            speech.cancel();
        }
        log::info!("Chat coordinator torn down");
    }

    // ─── Internals ───────────────────────────────────────────

    /// Drop the in-flight request and any pending history load.
    fn abandon_in_flight(&self, st: &mut ChatState) {
        let outstanding = st.sequencer.outstanding();
        if outstanding > 0 {
            log::debug!("Abandoning {} unanswered request(s)", outstanding);
        }
        self.backend.cancel_pending();
        st.sequencer.invalidate();
        if let Some(flight) = st.in_flight.take() {
            self.remove_message(st, &flight.typing_id);
            self.bus.emit(ChatEvent::RequestFinished { success: false });
        }
    }

    fn cancel_dictation(&self, st: &mut ChatState) {
        if !std::mem::replace(&mut st.dictating, false) {
            return;
        }
        if let Some(port) = &self.dictation {
            port.cancel();
        }
        self.bus.emit(ChatEvent::DictationFinished { transcript: None });
    }

    /// Return to `Idle`, freeing whatever the current input state holds.
    fn reset_input(&self, st: &mut ChatState) {
        st.recording_requested = false;
        st.stop_requested = false;
        match std::mem::replace(&mut st.input, InputState::Idle) {
            InputState::Idle => return,
            InputState::ImageStaged(image) => self.media.release_preview(&image.preview_url),
            InputState::Recording { .. } => self.media.cancel_recording(),
            InputState::AudioReview(clip) => self.media.release_preview(&clip.preview_url),
        }
        self.emit_mode(st);
    }

    fn emit_mode(&self, st: &ChatState) {
        self.bus.emit(ChatEvent::ModeChanged {
            mode: st.input.mode(),
            preview: st.input.attachment().map(|a| a.preview()),
        });
    }

    fn append(&self, st: &mut ChatState, message: Message) {
        st.transcript.push(message.clone());
        self.bus.emit(ChatEvent::MessageAppended { message });
    }

    fn remove_message(&self, st: &mut ChatState, local_id: &str) {
        let before = st.transcript.len();
        st.transcript.retain(|m| m.local_id != local_id);
        if st.transcript.len() != before {
            self.bus.emit(ChatEvent::MessageRemoved {
                local_id: local_id.to_string(),
            });
        }
    }

    /// Swap the transcript, freeing object URLs the old one pointed at.
    fn replace_transcript(&self, st: &mut ChatState, messages: Vec<Message>) {
        for old in &st.transcript {
            for url in [&old.image_url, &old.audio_url].into_iter().flatten() {
                if url.starts_with("blob:") {
                    self.media.release_preview(url);
                }
            }
        }
        st.transcript = messages.clone();
        self.bus.emit(ChatEvent::TranscriptReplaced { messages });
    }
}

/// Inline bot text for a failed chat request.
pub(crate) fn failure_text(error: &ChatError, kind: RequestKind) -> String {
    if let Some(message) = error.server_message().filter(|m| !m.trim().is_empty()) {
        return format!("Error: {}", message);
    }
    match error {
        ChatError::Network(_) => "Network error.".to_string(),
        _ if kind == RequestKind::Audio => "Error processing audio.".to_string(),
        ChatError::Server { .. } | ChatError::Serialization(_) => "Error: Unknown".to_string(),
        other => format!("Error: {}", other),
    }
}

/// `m:ss` for the recording timer.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
