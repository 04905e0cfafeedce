//! Read-aloud of assistant replies with the Web Speech API.

use web_sys::{SpeechSynthesis, SpeechSynthesisUtterance};

use agristar_core::ports::SpeechPort;
use agristar_types::language::Language;

const SPEECH_RATE: f32 = 0.9;
const SPEECH_PITCH: f32 = 1.0;

pub struct BrowserSpeech {
    synth: SpeechSynthesis,
}

impl BrowserSpeech {
    /// `None` when the browser has no speech synthesis.
    pub fn new() -> Option<Self> {
        let synth = web_sys::window()?.speech_synthesis().ok()?;
        Some(Self { synth })
    }
}

impl SpeechPort for BrowserSpeech {
    fn speak(&self, text: &str, language: Language) {
        let plain = spoken_text(text);
        if plain.is_empty() {
            return;
        }
        let utterance = match SpeechSynthesisUtterance::new_with_text(&plain) {
            Ok(u) => u,
            Err(e) => {
                log::warn!("Cannot create utterance: {:?}", e);
                return;
            }
        };
        utterance.set_lang(language.speech_locale());
        utterance.set_rate(SPEECH_RATE);
        utterance.set_pitch(SPEECH_PITCH);
        self.synth.cancel();
        self.synth.speak(&utterance);
    }

    fn cancel(&self) {
        self.synth.cancel();
    }
}

/// Strip markdown emphasis so it is not read out as symbols.
pub fn spoken_text(text: &str) -> String {
    text.replace("**", "").trim().to_string()
}
