//! Overlays: blocking alert, delete confirmation and toasts.

use egui::{self, Align2, Id, RichText};

use agristar_types::event::NoticeLevel;

use crate::action::ChatAction;
use crate::state::UiState;
use crate::theme::*;

/// Draw every overlay that is currently open. Returns a confirmed delete.
pub fn overlays(ctx: &egui::Context, state: &mut UiState, now: f64) -> Option<ChatAction> {
    alert_window(ctx, state);
    let action = delete_confirmation(ctx, state);
    toasts(ctx, state, now);
    action
}

fn alert_window(ctx: &egui::Context, state: &mut UiState) {
    let Some(message) = state.alert.clone() else {
        return;
    };
    let mut acknowledged = false;
    egui::Window::new("Notice")
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(RichText::new(&message).color(TEXT_PRIMARY));
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                acknowledged = true;
            }
        });
    if acknowledged || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        state.dismiss_alert();
    }
}

fn delete_confirmation(ctx: &egui::Context, state: &mut UiState) -> Option<ChatAction> {
    let session_id = state.confirm_delete.clone()?;
    let title = state
        .history
        .iter()
        .find(|e| e.id == session_id)
        .map(|e| e.title.clone())
        .unwrap_or_default();

    let mut choice = None;
    egui::Window::new("Delete chat")
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(format!("Are you sure you want to delete \"{}\"?", title));
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                let delete = egui::Button::new(RichText::new("Delete").color(TEXT_ON_DARK)).fill(ERROR);
                if ui.add(delete).clicked() {
                    choice = Some(true);
                }
                if ui.button("Cancel").clicked() {
                    choice = Some(false);
                }
            });
        });

    match choice {
        Some(true) => {
            state.confirm_delete = None;
            Some(ChatAction::DeleteSession(session_id))
        }
        Some(false) => {
            state.confirm_delete = None;
            None
        }
        None => None,
    }
}

fn toasts(ctx: &egui::Context, state: &mut UiState, now: f64) {
    state.prune_toasts(now);
    if state.toasts.is_empty() {
        return;
    }
    egui::Area::new(Id::new("toasts"))
        .anchor(Align2::RIGHT_BOTTOM, [-16.0, -16.0])
        .show(ctx, |ui| {
            for toast in &state.toasts {
                let fill = match toast.level {
                    NoticeLevel::Info => ACCENT,
                    NoticeLevel::Error => ERROR,
                };
                egui::Frame::default()
                    .fill(fill)
                    .corner_radius(PANEL_ROUNDING)
                    .inner_margin(10.0)
                    .show(ui, |ui| {
                        ui.label(RichText::new(&toast.message).color(TEXT_ON_DARK));
                    });
                ui.add_space(6.0);
            }
        });

    if let Some(next) = state.toasts.iter().map(|t| t.expires_at).reduce(f64::min) {
        ctx.request_repaint_after(std::time::Duration::from_secs_f64((next - now).max(0.05)));
    }
}
