//! Which input controls exist in each mode.
//!
//! Kept free of egui so the rules can be tested directly.

use agristar_types::attachment::InputMode;
use agristar_types::config::FeatureFlags;
use agristar_types::message::{Message, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputControls {
    /// Text field accepts typing
    pub text: bool,
    /// Send button for text / staged image
    pub send: bool,
    /// Gallery and camera buttons
    pub attach_image: bool,
    pub start_recording: bool,
    /// Speech-to-text toggle next to the text field
    pub dictate: bool,
    /// Thumbnail with a remove button
    pub image_preview: bool,
    /// Pulsing bar with the timer and a stop button
    pub recording_bar: bool,
    /// Player with discard and send
    pub audio_review: bool,
    pub send_audio: bool,
}

pub fn input_controls(
    mode: InputMode,
    features: &FeatureFlags,
    busy: bool,
    dictating: bool,
) -> InputControls {
    match mode {
        InputMode::Idle => InputControls {
            text: true,
            send: !busy,
            attach_image: features.image && !busy,
            start_recording: features.voice && !busy && !dictating,
            dictate: features.dictation,
            ..InputControls::default()
        },
        InputMode::ImageStaged => InputControls {
            text: true,
            send: !busy,
            attach_image: features.image && !busy,
            dictate: features.dictation,
            image_preview: true,
            ..InputControls::default()
        },
        InputMode::Recording => InputControls {
            recording_bar: true,
            ..InputControls::default()
        },
        InputMode::AudioReview => InputControls {
            audio_review: true,
            send_audio: !busy,
            ..InputControls::default()
        },
    }
}

/// Quick tips are offered until the user has said something.
pub fn show_quick_tips(transcript: &[Message], tips: &[String]) -> bool {
    !tips.is_empty() && transcript.iter().all(|m| m.sender == Sender::Bot && !m.is_typing())
}
