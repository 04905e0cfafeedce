//! AgriStar chat client — WASM entry point.
//!
//! This crate is the composition root (DI wiring layer).
//! It reads the host page's configuration, builds the browser adapters and
//! the coordinator, and hands them to the egui UI.

mod app;
mod page;


use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use page::{CANVAS_ID, PageConfig};

/// WASM entry point — runs when the module is instantiated
#[wasm_bindgen(start)]
pub async fn main() {
    // Initialize logging
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("AgriStar chat starting...");

    let Some(canvas) = find_canvas() else {
        log::error!("No canvas element with id '{}'", CANVAS_ID);
        return;
    };
    let page = PageConfig::from_element(&canvas);
    log::info!(
        "Endpoints: chat={} history={} (image={}, voice={})",
        page.chat.chat_url(),
        page.chat.history_url(),
        page.chat.features.image,
        page.chat.features.voice
    );

    let web_options = eframe::WebOptions::default();
    wasm_bindgen_futures::spawn_local(async move {
        let started = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(move |cc| Ok(Box::new(app::AgriStarApp::new(cc, page)))),
            )
            .await;
        if let Err(e) = started {
            log::error!("Failed to start eframe: {:?}", e);
        }
    });
}

fn find_canvas() -> Option<web_sys::HtmlCanvasElement> {
    web_sys::window()?
        .document()?
        .get_element_by_id(CANVAS_ID)?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .ok()
}
