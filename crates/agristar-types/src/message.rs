use serde::{Deserialize, Serialize};

/// Who wrote a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    #[serde(alias = "ai", alias = "assistant")]
    Bot,
}

/// How a transcript entry should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    /// Locally generated failure text, styled as a bot message
    Error,
    /// Ephemeral "typing" indicator shown while a request is in flight
    Typing,
}

/// A single entry in the transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Client-side key, stable for the lifetime of the entry
    pub local_id: String,
    pub sender: Sender,
    pub kind: MessageKind,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

impl Message {
    fn new(sender: Sender, kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            local_id: uuid::Uuid::new_v4().to_string(),
            sender,
            kind,
            text: text.into(),
            image_url: None,
            audio_url: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, MessageKind::Text, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, MessageKind::Text, text)
    }

    pub fn bot_error(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, MessageKind::Error, text)
    }

    pub fn typing() -> Self {
        Self::new(Sender::Bot, MessageKind::Typing, "")
    }

    pub fn user_image(preview_url: impl Into<String>) -> Self {
        Self::new(Sender::User, MessageKind::Text, "").with_image(preview_url)
    }

    pub fn user_audio(preview_url: impl Into<String>) -> Self {
        Self::new(Sender::User, MessageKind::Text, "").with_audio(preview_url)
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_audio(mut self, url: impl Into<String>) -> Self {
        self.audio_url = Some(url.into());
        self
    }

    pub fn is_typing(&self) -> bool {
        self.kind == MessageKind::Typing
    }

    pub fn has_media(&self) -> bool {
        self.image_url.is_some() || self.audio_url.is_some()
    }
}
