//! User intents collected by the panels and executed by the app shell.

use agristar_types::language::Language;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatAction {
    SendText(String),
    /// Open the file picker; `camera` requests direct capture
    PickImage { camera: bool },
    ClearImage,
    /// Start speech-to-text, or stop it early when already listening
    Dictate,
    StartRecording,
    StopRecording,
    DiscardAudio,
    SendAudio,
    SetLanguage(Language),
    NewChat,
    LoadSession(String),
    RenameSession { session_id: String, title: String },
    DeleteSession(String),
}
