//! JSON and multipart contracts of the assistant backend.

use serde::{Deserialize, Deserializer, Serialize};

use crate::attachment::{AudioClip, ImageFile};
use crate::language::Language;
use crate::message::{Message, Sender};
use crate::session::HistoryEntry;

/// Body of the text chat POST. `session_id` is sent as `null` before the
/// first reply creates a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextChatRequest {
    pub message: String,
    pub language: Language,
    pub session_id: Option<String>,
}

/// Multipart fields: `image`, `message`, `language`, `session_id?`
#[derive(Debug, Clone, PartialEq)]
pub struct VisionChatRequest {
    pub image: ImageFile,
    pub message: String,
    pub language: Language,
    pub session_id: Option<String>,
}

/// Multipart fields: `audio`, `language`, `session_id?`
#[derive(Debug, Clone, PartialEq)]
pub struct AudioChatRequest {
    pub clip: AudioClip,
    pub language: Language,
    pub session_id: Option<String>,
}

/// Successful reply shared by the text, vision and audio endpoints
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub session_id: Option<String>,
    #[serde(default)]
    pub session_title: Option<String>,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryMessage {
    pub sender: Sender,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
}

impl From<HistoryMessage> for Message {
    fn from(h: HistoryMessage) -> Self {
        let mut msg = match h.sender {
            Sender::User => Message::user(h.text),
            Sender::Bot => Message::bot(h.text),
        };
        msg.image_url = h.image_url.filter(|u| !u.is_empty());
        msg.audio_url = h.audio_url.filter(|u| !u.is_empty());
        msg
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenameRequest {
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenameResponse {
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionListResponse {
    #[serde(default, alias = "sessions")]
    pub conversations: Vec<HistoryEntry>,
}

/// Session ids are opaque strings, but some backends emit integer keys.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

pub(crate) fn id_string<'de, D>(d: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(d).map(String::from)
}

pub(crate) fn opt_id_string<'de, D>(d: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(d)?
        .map(String::from)
        .filter(|id| !id.is_empty()))
}
