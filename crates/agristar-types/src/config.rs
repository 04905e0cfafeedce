use serde::{Deserialize, Serialize};
use crate::language::Language;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Top-level chat client configuration.
/// Every field has a default so the page may supply partial JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Prefix for every endpoint path; empty means same origin
    pub base_url: String,
    pub endpoints: EndpointSet,
    pub features: FeatureFlags,
    pub csrf: CsrfConfig,
    pub limits: ImageLimits,
    pub language: Language,
    pub greeting: String,
    pub default_image_prompt: String,
    /// Canned questions offered before the first message
    pub quick_tips: Vec<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            endpoints: EndpointSet::default(),
            features: FeatureFlags::default(),
            csrf: CsrfConfig::default(),
            limits: ImageLimits::default(),
            language: Language::En,
            greeting: DEFAULT_GREETING.to_string(),
            default_image_prompt: "Describe this image".to_string(),
            quick_tips: DEFAULT_QUICK_TIPS.iter().map(|q| q.to_string()).collect(),
        }
    }
}

impl ChatConfig {
    /// Text-only floating widget shown on marketplace pages.
    pub fn public_widget() -> Self {
        Self {
            endpoints: EndpointSet {
                chat: "/ai/public-chat/".to_string(),
                ..EndpointSet::default()
            },
            features: FeatureFlags {
                image: false,
                voice: false,
                history: false,
                speak_replies: false,
                detect_language: false,
                dictation: false,
            },
            greeting: "Hi! Ask me anything about AgriStar.".to_string(),
            quick_tips: Vec::new(),
            ..Self::default()
        }
    }

    pub fn chat_url(&self) -> String {
        self.url(&self.endpoints.chat)
    }

    pub fn vision_url(&self) -> String {
        self.url(&self.endpoints.vision)
    }

    pub fn voice_url(&self) -> String {
        self.url(&self.endpoints.voice)
    }

    pub fn history_url(&self) -> String {
        self.url(&self.endpoints.history)
    }

    /// `{history}{id}/` — the per-session resource used by GET/PUT/DELETE
    pub fn session_url(&self, id: &str) -> String {
        let base = self.history_url();
        if base.ends_with('/') {
            format!("{}{}/", base, id)
        } else {
            format!("{}/{}/", base, id)
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointSet {
    pub chat: String,
    pub vision: String,
    pub voice: String,
    pub history: String,
}

impl Default for EndpointSet {
    fn default() -> Self {
        Self {
            chat: "/ai/chat/".to_string(),
            vision: "/ai/vision/".to_string(),
            voice: "/ai/voice/".to_string(),
            history: "/ai/history/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub image: bool,
    pub voice: bool,
    pub history: bool,
    /// Read successful replies aloud
    pub speak_replies: bool,
    /// Pick the request language from the message text instead of the toggle
    pub detect_language: bool,
    /// Speech-to-text into the input field
    pub dictation: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            image: true,
            voice: true,
            history: true,
            speak_replies: false,
            detect_language: false,
            dictation: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsrfConfig {
    pub cookie_name: String,
    pub header_name: String,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            cookie_name: "csrftoken".to_string(),
            header_name: "X-CSRFToken".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageLimits {
    pub max_image_bytes: usize,
    pub allowed_image_types: Vec<String>,
}

impl Default for ImageLimits {
    fn default() -> Self {
        Self {
            max_image_bytes: MAX_IMAGE_BYTES,
            allowed_image_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/webp".to_string(),
            ],
        }
    }
}

const DEFAULT_QUICK_TIPS: &[&str] = &[
    "How do I control fall armyworm in maize?",
    "When is the best time to plant beans?",
    "How can I improve my soil fertility?",
];

const DEFAULT_GREETING: &str =
    "Hello! I'm ready for a new conversation. How can I help you?";
