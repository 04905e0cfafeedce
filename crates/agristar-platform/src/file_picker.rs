//! Native file dialog for staging an image.
//!
//! egui cannot open an OS picker on the web, so a detached
//! `<input type="file">` is created and clicked. On phones the camera
//! variant sets `capture` so the rear camera opens directly.
//!
//! Dismissal is reported by the input's `cancel` event where the browser has
//! one. Elsewhere the window regaining focus with no file selected counts as
//! a dismissal once a short grace period has passed.

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use gloo_timers::callback::Timeout;
use js_sys::Uint8Array;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Event, HtmlInputElement, Url};

use agristar_types::{ChatError, Result, attachment::ImageFile};

use crate::backend::js_err;

/// Time allowed for `change` to arrive after the window regains focus
const DISMISS_GRACE_MS: u32 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Gallery,
    Camera,
}

/// Open the picker and read the chosen file. `Ok(None)` when the user
/// dismisses the dialog.
pub async fn pick_image(source: ImageSource, accept: &[String]) -> Result<Option<ImageFile>> {
    let input = gloo_utils::document()
        .create_element("input")
        .map_err(js_err)?
        .dyn_into::<HtmlInputElement>()
        .map_err(|_| ChatError::JsInterop("input element expected".to_string()))?;
    input.set_type("file");
    input.set_accept(&accept.join(","));
    if source == ImageSource::Camera {
        input.set_attribute("capture", "environment").map_err(js_err)?;
    }

    let (tx, rx) = oneshot::channel::<bool>();
    let tx = Rc::new(RefCell::new(Some(tx)));
    let notify = |chosen: bool| {
        let tx = tx.clone();
        Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(chosen);
            }
        })
    };
    let on_change = notify(true);
    let on_cancel = notify(false);
    input.set_onchange(Some(on_change.as_ref().unchecked_ref()));
    input
        .add_event_listener_with_callback("cancel", on_cancel.as_ref().unchecked_ref())
        .map_err(js_err)?;

    let on_focus = {
        let tx = tx.clone();
        let input = input.clone();
        let mut check: Option<Timeout> = None;
        Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            let tx = tx.clone();
            let input = input.clone();
            check = Some(Timeout::new(DISMISS_GRACE_MS, move || {
                let nothing_chosen = input.files().map_or(true, |files| files.length() == 0);
                if nothing_chosen {
                    if let Some(tx) = tx.borrow_mut().take() {
                        let _ = tx.send(false);
                    }
                }
            }));
        })
    };
    let window = gloo_utils::window();
    window
        .add_event_listener_with_callback("focus", on_focus.as_ref().unchecked_ref())
        .map_err(js_err)?;

    input.click();
    let chosen = rx.await.unwrap_or(false);
    input.set_onchange(None);
    let _ = input.remove_event_listener_with_callback("cancel", on_cancel.as_ref().unchecked_ref());
    let _ = window.remove_event_listener_with_callback("focus", on_focus.as_ref().unchecked_ref());
    if !chosen {
        log::debug!("Image picker dismissed");
        return Ok(None);
    }

    let Some(file) = input.files().and_then(|files| files.get(0)) else {
        return Ok(None);
    };
    let buffer = JsFuture::from(file.array_buffer()).await.map_err(js_err)?;
    let bytes = Uint8Array::new(&buffer).to_vec();
    let preview_url = Url::create_object_url_with_blob(&file).map_err(js_err)?;
    log::info!("Picked {} ({}, {} bytes)", file.name(), file.type_(), bytes.len());

    Ok(Some(ImageFile {
        name: file.name(),
        mime_type: file.type_(),
        bytes,
        preview_url,
    }))
}
