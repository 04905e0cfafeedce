//! History sidebar — New Chat, session list, inline rename, delete.

use egui::{self, Align, Layout, RichText, ScrollArea};

use crate::action::ChatAction;
use crate::state::UiState;
use crate::theme::*;

pub fn history_panel(ui: &mut egui::Ui, state: &mut UiState) -> Option<ChatAction> {
    let mut action = None;

    egui::Frame::default()
        .fill(BG_SIDEBAR)
        .inner_margin(PANEL_PADDING)
        .show(ui, |ui| {
            ui.set_min_height(ui.available_height());
            let new_chat = egui::Button::new(RichText::new("＋ New Chat").color(TEXT_ON_DARK))
                .fill(ACCENT)
                .corner_radius(PANEL_ROUNDING);
            if ui.add_sized([ui.available_width(), 32.0], new_chat).clicked() {
                action = Some(ChatAction::NewChat);
            }

            ui.add_space(8.0);
            ui.label(RichText::new("Recent").color(TEXT_ON_DARK).small());

            ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
                if state.history.is_empty() {
                    ui.label(RichText::new("No conversations yet").color(TEXT_SECONDARY).italics());
                }
                let entries = state.history.clone();
                for entry in &entries {
                    let editing = state
                        .rename
                        .as_ref()
                        .is_some_and(|d| d.session_id == entry.id);
                    let row = if editing {
                        rename_row(ui, state)
                    } else {
                        entry_row(ui, state, entry)
                    };
                    if row.is_some() {
                        action = row;
                    }
                }
            });
        });

    action
}

fn entry_row(
    ui: &mut egui::Ui,
    state: &mut UiState,
    entry: &agristar_types::session::HistoryEntry,
) -> Option<ChatAction> {
    let mut action = None;
    let active = state.is_active(&entry.id);
    ui.horizontal(|ui| {
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            if ui.small_button("🗑").on_hover_text("Delete chat").clicked() {
                state.confirm_delete = Some(entry.id.clone());
            }
            if ui.small_button("✏").on_hover_text("Rename chat").clicked() {
                state.begin_rename(entry);
            }
            ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
                let label = RichText::new(format!("💬 {}", entry.title)).color(TEXT_ON_DARK);
                if ui.selectable_label(active, label).clicked() && !active {
                    action = Some(ChatAction::LoadSession(entry.id.clone()));
                }
            });
        });
    });
    action
}

fn rename_row(ui: &mut egui::Ui, state: &mut UiState) -> Option<ChatAction> {
    let draft = state.rename.as_mut()?;
    let response = ui.add(
        egui::TextEdit::singleline(&mut draft.title)
            .hint_text("Chat name")
            .desired_width(ui.available_width()),
    );
    if !response.has_focus() && !response.lost_focus() {
        response.request_focus();
    }

    let (enter, escape) = ui.input(|i| (i.key_pressed(egui::Key::Enter), i.key_pressed(egui::Key::Escape)));
    if escape {
        state.rename = None;
        return None;
    }
    if response.lost_focus() {
        let draft = state.rename.take()?;
        let title = draft.title.trim();
        if enter && !title.is_empty() {
            return Some(ChatAction::RenameSession {
                session_id: draft.session_id,
                title: title.to_string(),
            });
        }
    }
    None
}
