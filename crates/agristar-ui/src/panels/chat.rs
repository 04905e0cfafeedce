//! Chat panel — transcript, language toggle and the per-mode input bar.

use std::time::Duration;

use egui::{self, Align, Layout, RichText, ScrollArea, Vec2};

use agristar_core::format_elapsed;
use agristar_types::config::FeatureFlags;
use agristar_types::language::Language;
use agristar_types::message::{Message, MessageKind, Sender};

use crate::action::ChatAction;
use crate::format::{Segment, segments};
use crate::state::UiState;
use crate::theme::*;
use crate::view::{input_controls, show_quick_tips};

const INPUT_BAR_HEIGHT: f32 = 64.0;

/// Render the chat panel. Returns the user's intent, if any, this frame.
/// `now_ms` is wall-clock epoch millis for the recording timer.
pub fn chat_panel(
    ui: &mut egui::Ui,
    state: &mut UiState,
    features: &FeatureFlags,
    quick_tips: &[String],
    now_ms: i64,
) -> Option<ChatAction> {
    let mut action = None;

    egui::Frame::default()
        .fill(BG_PRIMARY)
        .inner_margin(PANEL_PADDING)
        .show(ui, |ui| {
            ui.vertical(|ui| {
                if let Some(a) = header(ui, state) {
                    action = Some(a);
                }
                ui.separator();

                let available_height = ui.available_height() - INPUT_BAR_HEIGHT;
                ScrollArea::vertical()
                    .max_height(available_height)
                    .auto_shrink([false, false])
                    .stick_to_bottom(true)
                    .show(ui, |ui| transcript(ui, state));

                ui.add_space(8.0);
                if show_quick_tips(&state.transcript, quick_tips) && !state.is_busy() {
                    if let Some(a) = tips_row(ui, quick_tips) {
                        action = Some(a);
                    }
                }
                if let Some(a) = input_bar(ui, state, features, now_ms) {
                    action = Some(a);
                }
            });
        });

    action
}

fn header(ui: &mut egui::Ui, state: &UiState) -> Option<ChatAction> {
    let mut action = None;
    ui.horizontal(|ui| {
        let title = state
            .session
            .as_ref()
            .map(|s| s.title.as_str())
            .unwrap_or("AgriStar Assistant");
        ui.heading(RichText::new(title).color(TEXT_PRIMARY).strong());

        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            for language in Language::all().iter().rev() {
                let selected = state.language == *language;
                if ui
                    .selectable_label(selected, language.tag().to_uppercase())
                    .on_hover_text(language.label())
                    .clicked()
                    && !selected
                {
                    action = Some(ChatAction::SetLanguage(*language));
                }
            }
            ui.separator();
            let status_color = if state.is_busy() { WARNING } else { SUCCESS };
            ui.label(RichText::new(&state.status_text).color(status_color).small());
        });
    });
    action
}

fn transcript(ui: &mut egui::Ui, state: &UiState) {
    if state.loading.is_some() {
        ui.add_space(40.0);
        ui.vertical_centered(|ui| {
            ui.spinner();
            ui.label(RichText::new("Loading history...").color(TEXT_SECONDARY));
        });
        return;
    }
    if let Some(error) = &state.load_error {
        egui::Frame::default()
            .fill(BUBBLE_ERROR)
            .corner_radius(PANEL_ROUNDING)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new(error).color(ERROR));
            });
        ui.add_space(8.0);
    }

    for message in &state.transcript {
        render_message(ui, message);
        ui.add_space(6.0);
    }
}

fn render_message(ui: &mut egui::Ui, message: &Message) {
    let is_user = message.sender == Sender::User;
    let layout = if is_user {
        Layout::top_down(Align::Max)
    } else {
        Layout::top_down(Align::Min)
    };

    ui.with_layout(layout, |ui| {
        let (avatar, avatar_color) = if is_user {
            ("You", ACCENT)
        } else {
            ("AgriStar", BUBBLE_USER)
        };
        ui.label(RichText::new(avatar).color(avatar_color).strong().small());

        let (fill, text_color) = match (message.sender, message.kind) {
            (_, MessageKind::Error) => (BUBBLE_ERROR, ERROR),
            (Sender::User, _) => (BUBBLE_USER, TEXT_ON_DARK),
            (Sender::Bot, _) => (BUBBLE_BOT, TEXT_PRIMARY),
        };

        egui::Frame::default()
            .fill(fill)
            .corner_radius(BUBBLE_ROUNDING)
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.set_max_width(BUBBLE_MAX_WIDTH);
                if message.is_typing() {
                    typing_dots(ui);
                    return;
                }
                if message.has_media() {
                    media_links(ui, message, text_color);
                }
                if !message.text.is_empty() {
                    rich_text(ui, &message.text, text_color);
                }
            });
    });
}

fn media_links(ui: &mut egui::Ui, message: &Message, color: egui::Color32) {
    if let Some(url) = &message.image_url {
        ui.hyperlink_to(RichText::new("🖼 View image").color(color), url);
    }
    if let Some(url) = &message.audio_url {
        ui.hyperlink_to(RichText::new("▶ Play voice note").color(color), url);
    }
}

fn typing_dots(ui: &mut egui::Ui) {
    let time = ui.input(|i| i.time);
    let dots = (time * 3.0) as usize % 3 + 1;
    ui.label(RichText::new("●".repeat(dots)).color(TEXT_SECONDARY));
    ui.ctx().request_repaint_after(Duration::from_millis(300));
}

fn rich_text(ui: &mut egui::Ui, text: &str, color: egui::Color32) {
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        for segment in segments(text) {
            match segment {
                Segment::Text { text, bold } => {
                    let rich = RichText::new(text).color(color);
                    ui.label(if bold { rich.strong() } else { rich });
                }
                Segment::LineBreak => ui.end_row(),
            }
        }
    });
}

fn tips_row(ui: &mut egui::Ui, tips: &[String]) -> Option<ChatAction> {
    let mut action = None;
    ui.horizontal_wrapped(|ui| {
        for tip in tips {
            let chip = egui::Button::new(RichText::new(tip).color(ACCENT).small())
                .fill(BUBBLE_BOT)
                .corner_radius(PANEL_ROUNDING);
            if ui.add(chip).clicked() {
                action = Some(ChatAction::SendText(tip.clone()));
            }
        }
    });
    ui.add_space(6.0);
    action
}

fn input_bar(
    ui: &mut egui::Ui,
    state: &mut UiState,
    features: &FeatureFlags,
    now_ms: i64,
) -> Option<ChatAction> {
    let controls = input_controls(state.mode, features, state.is_busy(), state.dictating);
    let mut action = None;

    if controls.image_preview {
        ui.horizontal(|ui| {
            if let Some(preview) = &state.preview {
                ui.hyperlink_to(format!("🖼 {}", preview.label), &preview.url);
            }
            if ui.small_button("✖").on_hover_text("Remove image").clicked() {
                action = Some(ChatAction::ClearImage);
            }
        });
    }

    if controls.recording_bar {
        ui.horizontal(|ui| {
            let elapsed = state.recording_seconds(now_ms).unwrap_or(0);
            ui.label(RichText::new("●").color(RECORDING));
            ui.label(
                RichText::new(format!("{}  {}", state.status_text, format_elapsed(elapsed)))
                    .color(TEXT_PRIMARY),
            );
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                let stop = egui::Button::new(RichText::new("⏹ Stop").color(TEXT_ON_DARK))
                    .fill(RECORDING)
                    .corner_radius(PANEL_ROUNDING);
                if ui.add(stop).clicked() {
                    action = Some(ChatAction::StopRecording);
                }
            });
        });
        return action;
    }

    if controls.audio_review {
        ui.horizontal(|ui| {
            if let Some(preview) = &state.preview {
                ui.hyperlink_to(format!("▶ {}", preview.label), &preview.url);
            }
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                let send = egui::Button::new(RichText::new("Send").color(TEXT_ON_DARK))
                    .fill(ACCENT)
                    .corner_radius(PANEL_ROUNDING);
                if ui.add_enabled(controls.send_audio, send).clicked() {
                    action = Some(ChatAction::SendAudio);
                }
                if ui.button("🗑 Discard").clicked() {
                    action = Some(ChatAction::DiscardAudio);
                }
            });
        });
        return action;
    }

    ui.horizontal(|ui| {
        if features.image {
            if ui
                .add_enabled(controls.attach_image, egui::Button::new("🖼"))
                .on_hover_text("Attach image")
                .clicked()
            {
                action = Some(ChatAction::PickImage { camera: false });
            }
            if ui
                .add_enabled(controls.attach_image, egui::Button::new("📷"))
                .on_hover_text("Take photo")
                .clicked()
            {
                action = Some(ChatAction::PickImage { camera: true });
            }
        }

        let input = egui::TextEdit::singleline(&mut state.input_text)
            .hint_text("Ask about your crops...")
            .desired_width(ui.available_width() - 150.0)
            .font(egui::FontId::proportional(14.0));
        let response = ui.add_enabled(controls.text, input);

        if controls.dictate {
            let (label, hint) = if state.dictating {
                (RichText::new("⏹").color(RECORDING), "Stop listening")
            } else {
                (RichText::new("🗣"), "Speak your question")
            };
            if ui.add(egui::Button::new(label)).on_hover_text(hint).clicked() {
                action = Some(ChatAction::Dictate);
            }
        }

        if features.voice
            && ui
                .add_enabled(controls.start_recording, egui::Button::new("🎤"))
                .on_hover_text("Record voice note")
                .clicked()
        {
            action = Some(ChatAction::StartRecording);
        }

        let has_content = !state.input_text.trim().is_empty() || controls.image_preview;
        let send_enabled = controls.send && has_content;
        let send_btn = ui.add_enabled(
            send_enabled,
            egui::Button::new(RichText::new("Send").color(TEXT_ON_DARK))
                .fill(if send_enabled { ACCENT } else { TEXT_SECONDARY })
                .corner_radius(PANEL_ROUNDING)
                .min_size(Vec2::new(60.0, 0.0)),
        );

        // Submit on Enter or button click
        let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if (enter && send_enabled) || send_btn.clicked() {
            let text = state.input_text.trim().to_string();
            state.input_text.clear();
            action = Some(ChatAction::SendText(text));
            response.request_focus();
        }
    });

    action
}
