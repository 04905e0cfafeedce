//! UI theme constants

use egui::{Color32, CornerRadius, Stroke, Vec2};

pub const BG_PRIMARY: Color32 = Color32::from_rgb(244, 247, 242);
pub const BG_SIDEBAR: Color32 = Color32::from_rgb(27, 67, 50);
pub const BG_SURFACE: Color32 = Color32::from_rgb(255, 255, 255);
pub const BUBBLE_USER: Color32 = Color32::from_rgb(45, 106, 79);
pub const BUBBLE_BOT: Color32 = Color32::from_rgb(255, 255, 255);
pub const BUBBLE_ERROR: Color32 = Color32::from_rgb(253, 236, 234);
pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(33, 37, 41);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(108, 117, 125);
pub const TEXT_ON_DARK: Color32 = Color32::from_rgb(240, 247, 244);
pub const ACCENT: Color32 = Color32::from_rgb(64, 145, 108);
pub const SUCCESS: Color32 = Color32::from_rgb(82, 183, 136);
pub const ERROR: Color32 = Color32::from_rgb(192, 57, 43);
pub const WARNING: Color32 = Color32::from_rgb(230, 162, 60);
pub const RECORDING: Color32 = Color32::from_rgb(220, 53, 69);

pub const BUBBLE_ROUNDING: CornerRadius = CornerRadius::same(12);
pub const PANEL_ROUNDING: CornerRadius = CornerRadius::same(6);
pub const PANEL_PADDING: Vec2 = Vec2::new(12.0, 8.0);
pub const BUBBLE_MAX_WIDTH: f32 = 520.0;

/// Apply the AgriStar light theme to an egui context
pub fn apply_theme(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    style.visuals.dark_mode = false;
    style.visuals.panel_fill = BG_PRIMARY;
    style.visuals.window_fill = BG_SURFACE;
    style.visuals.extreme_bg_color = BG_SURFACE;
    style.visuals.hyperlink_color = ACCENT;

    style.visuals.widgets.inactive.bg_fill = BG_SURFACE;
    style.visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    style.visuals.widgets.hovered.bg_fill = SUCCESS.linear_multiply(0.3);
    style.visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    style.visuals.widgets.active.bg_fill = ACCENT;
    style.visuals.widgets.active.fg_stroke = Stroke::new(1.0, TEXT_ON_DARK);

    style.visuals.selection.bg_fill = ACCENT.linear_multiply(0.4);
    style.visuals.selection.stroke = Stroke::new(1.0, ACCENT);

    style.spacing.item_spacing = Vec2::new(8.0, 6.0);

    ctx.set_style(style);
}
