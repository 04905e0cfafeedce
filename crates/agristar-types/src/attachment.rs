use serde::{Deserialize, Serialize};
use crate::config::ImageLimits;
use crate::{ChatError, Result};

pub const AUDIO_MIME: &str = "audio/webm";
pub const AUDIO_FILE_NAME: &str = "recording.webm";

/// An image picked by the user, staged for the vision endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    /// Object URL shown as the preview thumbnail
    pub preview_url: String,
}

impl ImageFile {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Check size and type before anything is uploaded.
    pub fn validate(&self, limits: &ImageLimits) -> Result<()> {
        if self.size() > limits.max_image_bytes {
            return Err(ChatError::Validation(format!(
                "Image too large (max {}MB)",
                limits.max_image_bytes / (1024 * 1024)
            )));
        }
        if !limits
            .allowed_image_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(&self.mime_type))
        {
            return Err(ChatError::Validation(
                "Invalid format (use JPG, PNG, or WEBP)".to_string(),
            ));
        }
        Ok(())
    }
}

/// A finished microphone recording awaiting review
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub preview_url: String,
}

impl AudioClip {
    pub fn webm(bytes: Vec<u8>, preview_url: impl Into<String>) -> Self {
        Self {
            mime_type: AUDIO_MIME.to_string(),
            bytes,
            preview_url: preview_url.into(),
        }
    }
}

/// Which input controls are active. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    #[default]
    Idle,
    ImageStaged,
    Recording,
    AudioReview,
}

impl InputMode {
    pub fn label(&self) -> &'static str {
        match self {
            InputMode::Idle => "idle",
            InputMode::ImageStaged => "image staged",
            InputMode::Recording => "recording",
            InputMode::AudioReview => "reviewing audio",
        }
    }
}

/// What the input bar shows for a staged attachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentPreview {
    pub label: String,
    pub url: String,
}

/// The single staged-attachment slot
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAttachment {
    Image(ImageFile),
    Audio(AudioClip),
}

impl PendingAttachment {
    pub fn preview_url(&self) -> &str {
        match self {
            PendingAttachment::Image(img) => &img.preview_url,
            PendingAttachment::Audio(clip) => &clip.preview_url,
        }
    }

    pub fn preview(&self) -> AttachmentPreview {
        let label = match self {
            PendingAttachment::Image(img) => {
                format!("{} ({} KB)", img.name, img.size().div_ceil(1024))
            }
            PendingAttachment::Audio(clip) => {
                format!("Voice note ({} KB)", clip.bytes.len().div_ceil(1024))
            }
        };
        AttachmentPreview {
            label,
            url: self.preview_url().to_string(),
        }
    }
}
