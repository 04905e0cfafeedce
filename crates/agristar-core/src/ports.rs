//! Port traits — the hexagonal architecture boundary.
//!
//! These traits are defined here in `agristar-core` (pure Rust).
//! Implementations live in `agristar-platform` (browser adapters).
//! The coordinator never imports platform code; it only depends on these traits.

use async_trait::async_trait;
use agristar_types::{
    Result,
    attachment::AudioClip,
    language::Language,
    message::Message,
    session::HistoryEntry,
    wire::{AudioChatRequest, ChatReply, TextChatRequest, VisionChatRequest},
};

// ─── Backend Port ────────────────────────────────────────────

/// The assistant backend. Every state-changing call carries the CSRF token.
#[async_trait(?Send)]
pub trait ChatBackendPort {
    /// JSON text chat
    async fn send_text(&self, req: TextChatRequest) -> Result<ChatReply>;

    /// Multipart image + prompt
    async fn send_image(&self, req: VisionChatRequest) -> Result<ChatReply>;

    /// Multipart voice note
    async fn send_audio(&self, req: AudioChatRequest) -> Result<ChatReply>;

    /// Sidebar listing of the user's sessions
    async fn list_sessions(&self) -> Result<Vec<HistoryEntry>>;

    /// Full message list of one session, in server order
    async fn fetch_history(&self, session_id: &str) -> Result<Vec<Message>>;

    /// Returns the title the server stored
    async fn rename_session(&self, session_id: &str, title: &str) -> Result<String>;

    async fn delete_session(&self, session_id: &str) -> Result<()>;

    /// Abort the in-flight chat request, if any. Its future resolves with
    /// `ChatError::Cancelled` or is simply ignored by the caller.
    fn cancel_pending(&self);
}

// ─── Media Port ──────────────────────────────────────────────

#[async_trait(?Send)]
pub trait MediaPort {
    /// Ask for microphone access and begin buffering audio.
    /// Fails with `ChatError::Permission` when the user or browser refuses.
    async fn start_recording(&self) -> Result<()>;

    /// Finalize buffered chunks into one clip and release the microphone.
    async fn stop_recording(&self) -> Result<AudioClip>;

    /// Drop an active recording without producing a clip.
    fn cancel_recording(&self);

    /// Free a preview handle (object URL) created for an attachment.
    fn release_preview(&self, url: &str);
}

// ─── Speech Port ─────────────────────────────────────────────

pub trait SpeechPort {
    /// Read text aloud, interrupting anything already being spoken.
    fn speak(&self, text: &str, language: Language);

    fn cancel(&self);
}

// ─── Dictation Port ──────────────────────────────────────────

/// Speech-to-text for the input field.
#[async_trait(?Send)]
pub trait DictationPort {
    /// Listen for one utterance. Resolves with what was heard, `None` when
    /// listening ended without a result, or `ChatError::Cancelled` after
    /// [`cancel`](Self::cancel).
    async fn listen(&self, language: Language) -> Result<Option<String>>;

    /// Stop listening early, still delivering what was heard so far.
    fn stop(&self);

    /// Stop listening and discard the result.
    fn cancel(&self);
}
