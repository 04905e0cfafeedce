//! UI-level state that drives rendering.
//! This is a read-only projection of the coordinator's state,
//! updated each frame by draining the EventBus.

use agristar_types::attachment::{AttachmentPreview, InputMode};
use agristar_types::event::{ChatEvent, NoticeLevel};
use agristar_types::language::Language;
use agristar_types::message::Message;
use agristar_types::session::{HistoryEntry, SessionRef};

/// Seconds a toast stays on screen
pub const TOAST_SECONDS: f64 = 4.0;

/// State visible to UI panels
pub struct UiState {
    /// Transcript in display order, typing placeholder included
    pub transcript: Vec<Message>,
    pub mode: InputMode,
    /// Thumbnail / player for the staged attachment
    pub preview: Option<AttachmentPreview>,
    pub session: Option<SessionRef>,
    pub history: Vec<HistoryEntry>,
    pub language: Language,
    /// A chat request is in flight
    pub awaiting_reply: bool,
    /// Session whose history is being fetched
    pub loading: Option<String>,
    /// Banner shown above the transcript after a failed load
    pub load_error: Option<String>,
    /// Blocking alert awaiting acknowledgement
    pub alert: Option<String>,
    pub toasts: Vec<Toast>,
    /// Speech recognition is listening
    pub dictating: bool,
    /// Epoch millis when recording began
    pub recording_started_ms: Option<i64>,
    pub status_text: String,
    /// Input field content
    pub input_text: String,
    /// Inline rename in the sidebar
    pub rename: Option<RenameDraft>,
    /// Session awaiting delete confirmation
    pub confirm_delete: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub level: NoticeLevel,
    pub message: String,
    pub expires_at: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameDraft {
    pub session_id: String,
    pub title: String,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            transcript: Vec::new(),
            mode: InputMode::Idle,
            preview: None,
            session: None,
            history: Vec::new(),
            language: Language::default(),
            awaiting_reply: false,
            loading: None,
            load_error: None,
            alert: None,
            toasts: Vec::new(),
            dictating: false,
            recording_started_ms: None,
            status_text: Language::default().ready_label().to_string(),
            input_text: String::new(),
            rename: None,
            confirm_delete: None,
        }
    }

    /// Apply coordinator events. `now` is the frame time in seconds, used to
    /// schedule toast expiry.
    pub fn process_events(&mut self, events: Vec<ChatEvent>, now: f64) {
        for event in events {
            match event {
                ChatEvent::MessageAppended { message } => {
                    self.transcript.push(message);
                }
                ChatEvent::MessageRemoved { local_id } => {
                    self.transcript.retain(|m| m.local_id != local_id);
                }
                ChatEvent::TranscriptReplaced { messages } => {
                    // a load that landed, or a new chat that superseded it
                    self.transcript = messages;
                    self.load_error = None;
                    if self.loading.take().is_some() {
                        self.refresh_status();
                    }
                }
                ChatEvent::ModeChanged { mode, preview } => {
                    self.mode = mode;
                    self.preview = preview;
                    if mode != InputMode::Recording {
                        self.recording_started_ms = None;
                    }
                    self.refresh_status();
                }
                ChatEvent::RecordingStarted { started_at_ms } => {
                    self.recording_started_ms = Some(started_at_ms);
                }
                ChatEvent::SessionChanged { session } => {
                    self.session = session;
                    self.load_error = None;
                }
                ChatEvent::HistoryChanged { entries } => {
                    if let Some(draft) = &self.rename {
                        if !entries.iter().any(|e| e.id == draft.session_id) {
                            self.rename = None;
                        }
                    }
                    self.history = entries;
                }
                ChatEvent::LanguageChanged { language } => {
                    self.language = language;
                    self.refresh_status();
                }
                ChatEvent::RequestStarted { language } => {
                    // chatting on in the kept conversation retires the banner
                    self.load_error = None;
                    self.awaiting_reply = true;
                    self.status_text = language.thinking_label().to_string();
                }
                ChatEvent::RequestFinished { .. } => {
                    self.awaiting_reply = false;
                    self.refresh_status();
                }
                ChatEvent::LoadStarted { session_id } => {
                    self.loading = Some(session_id);
                    self.load_error = None;
                    self.status_text = "Loading history...".to_string();
                }
                ChatEvent::LoadFailed { session_id, message } => {
                    if self.loading.as_deref() == Some(session_id.as_str()) {
                        self.loading = None;
                    }
                    self.load_error = Some(message);
                    self.refresh_status();
                }
                ChatEvent::DictationStarted { language } => {
                    self.dictating = true;
                    self.status_text = language.listening_label().to_string();
                }
                ChatEvent::DictationFinished { transcript } => {
                    self.dictating = false;
                    if let Some(text) = transcript {
                        self.input_text = text;
                    }
                    self.refresh_status();
                }
                ChatEvent::DictationFailed { message } => {
                    log::debug!("dictation failed: {}", message);
                    self.dictating = false;
                    self.status_text = self.language.voice_error_label().to_string();
                }
                ChatEvent::Alert { message } => {
                    log::debug!("alert raised: {}", message);
                    self.alert = Some(message);
                }
                ChatEvent::Notice { level, message } => {
                    self.toasts.push(Toast {
                        level,
                        message,
                        expires_at: now + TOAST_SECONDS,
                    });
                }
            }
        }
    }

    fn refresh_status(&mut self) {
        self.status_text = if self.awaiting_reply {
            self.language.thinking_label()
        } else if self.mode == InputMode::Recording || self.dictating {
            self.language.listening_label()
        } else {
            self.language.ready_label()
        }
        .to_string();
    }

    /// Drop toasts whose time is up.
    pub fn prune_toasts(&mut self, now: f64) {
        self.toasts.retain(|t| t.expires_at > now);
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Sends and uploads are blocked.
    pub fn is_busy(&self) -> bool {
        self.awaiting_reply || self.loading.is_some()
    }

    pub fn is_active(&self, session_id: &str) -> bool {
        self.session.as_ref().is_some_and(|s| s.id == session_id)
    }

    /// Whole seconds recorded so far, for the `m:ss` timer.
    pub fn recording_seconds(&self, now_ms: i64) -> Option<u64> {
        self.recording_started_ms
            .map(|start| ((now_ms - start).max(0) / 1000) as u64)
    }

    pub fn begin_rename(&mut self, entry: &HistoryEntry) {
        self.rename = Some(RenameDraft {
            session_id: entry.id.clone(),
            title: entry.title.clone(),
        });
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}
