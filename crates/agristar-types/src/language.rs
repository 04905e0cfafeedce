use serde::{Deserialize, Serialize};

/// Reply language requested from the assistant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Sw,
}

const SWAHILI_MARKERS: &[&str] = &[
    "na", "kwa", "kuna", "sasa", "siku", "nini", "nifanye", "madoda", "majani",
    "mahindi", "samahani", "tafadhali", "asante", "habari", "vipi", "nimeona",
];

impl Language {
    pub fn all() -> &'static [Language] {
        &[Language::En, Language::Sw]
    }

    /// Tag sent to the backend
    pub fn tag(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Sw => "sw",
        }
    }

    /// BCP-47 locale for speech synthesis and recognition
    pub fn speech_locale(&self) -> &'static str {
        match self {
            Language::En => "en-US",
            Language::Sw => "sw-KE",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Language::En => "EN",
            Language::Sw => "SW",
        }
    }

    /// Keyword heuristic: any common Swahili word marks the text as Swahili.
    pub fn detect(text: &str) -> Language {
        let is_swahili = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .any(|w| {
                let w = w.to_lowercase();
                SWAHILI_MARKERS.contains(&w.as_str())
            });
        if is_swahili {
            Language::Sw
        } else {
            Language::En
        }
    }

    pub fn thinking_label(&self) -> &'static str {
        match self {
            Language::En => "Thinking...",
            Language::Sw => "Inajibu...",
        }
    }

    pub fn listening_label(&self) -> &'static str {
        match self {
            Language::En => "Listening...",
            Language::Sw => "Sikiliza...",
        }
    }

    pub fn voice_error_label(&self) -> &'static str {
        match self {
            Language::En => "Voice error",
            Language::Sw => "Hitilafu ya sauti",
        }
    }

    pub fn ready_label(&self) -> &'static str {
        match self {
            Language::En => "Ready",
            Language::Sw => "Tayari",
        }
    }
}
