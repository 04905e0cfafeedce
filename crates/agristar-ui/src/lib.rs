//! egui front end for the AgriStar chat client.
//!
//! Panels render from `UiState` and hand back `ChatAction`s; they never call
//! the coordinator themselves. `view` and `format` hold the rendering rules
//! that do not need an egui context.

pub mod action;
pub mod format;
pub mod panels;
pub mod state;
pub mod theme;
pub mod view;

#[cfg(test)]
mod tests;
