use serde::{Deserialize, Serialize};

use crate::attachment::{AttachmentPreview, InputMode};
use crate::language::Language;
use crate::message::Message;
use crate::session::{HistoryEntry, SessionRef};

/// Events emitted by the chat coordinator.
/// UI subscribes to these for reactive updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChatEvent {
    /// A message (including the typing placeholder) was appended
    MessageAppended { message: Message },

    /// A transcript entry was removed (typing placeholder)
    MessageRemoved { local_id: String },

    /// The whole transcript was swapped (history load, new chat)
    TranscriptReplaced { messages: Vec<Message> },

    /// Input mode switched; `preview` is set when an attachment is staged
    ModeChanged {
        mode: InputMode,
        preview: Option<AttachmentPreview>,
    },

    /// Microphone capture began, for the elapsed-time display
    RecordingStarted { started_at_ms: i64 },

    SessionChanged { session: Option<SessionRef> },

    HistoryChanged { entries: Vec<HistoryEntry> },

    LanguageChanged { language: Language },

    /// A chat request went out
    RequestStarted { language: Language },

    /// The in-flight chat request resolved or was abandoned
    RequestFinished { success: bool },

    LoadStarted { session_id: String },

    LoadFailed { session_id: String, message: String },

    /// Speech recognition is listening for a question
    DictationStarted { language: Language },

    /// Listening ended; `transcript` is what was heard, if anything
    DictationFinished { transcript: Option<String> },

    DictationFailed { message: String },

    /// Blocking error the user must acknowledge
    Alert { message: String },

    /// Non-blocking toast
    Notice { level: NoticeLevel, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Error,
}
