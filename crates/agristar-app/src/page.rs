//! Host-page configuration read from the canvas element.
//!
//! ```html
//! <canvas id="agristar_chat_canvas"
//!         data-chat-preset="widget"
//!         data-chat-config='{"features":{"speak_replies":true}}'
//!         data-session-id="42"></canvas>
//! ```

use serde_json::Value;
use web_sys::Element;

use agristar_types::{ChatError, Result, config::ChatConfig};

pub const CANVAS_ID: &str = "agristar_chat_canvas";

#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    pub chat: ChatConfig,
    /// Session to open on start, e.g. from a `/ai/chat/<id>/` URL
    pub initial_session: Option<String>,
}

impl PageConfig {
    pub fn from_element(canvas: &Element) -> Self {
        let preset = canvas.get_attribute("data-chat-preset");
        let overrides = canvas.get_attribute("data-chat-config");
        let chat = match resolve_config(preset.as_deref(), overrides.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Ignoring data-chat-config: {}", e);
                base_config(preset.as_deref())
            }
        };
        let initial_session = canvas
            .get_attribute("data-session-id")
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        Self {
            chat,
            initial_session,
        }
    }
}

fn base_config(preset: Option<&str>) -> ChatConfig {
    match preset.map(str::trim) {
        Some("widget") | Some("public") => ChatConfig::public_widget(),
        Some("") | Some("assistant") | None => ChatConfig::default(),
        Some(other) => {
            log::warn!("Unknown chat preset {:?}, using the full assistant", other);
            ChatConfig::default()
        }
    }
}

/// Merge a partial JSON object over the chosen preset.
pub fn resolve_config(preset: Option<&str>, overrides: Option<&str>) -> Result<ChatConfig> {
    let base = base_config(preset);
    let Some(raw) = overrides.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(base);
    };

    let patch: Value = serde_json::from_str(raw)?;
    if !patch.is_object() {
        return Err(ChatError::Config("expected a JSON object".to_string()));
    }
    let mut merged = serde_json::to_value(&base)?;
    merge_json(&mut merged, patch);
    Ok(serde_json::from_value(merged)?)
}

fn merge_json(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
