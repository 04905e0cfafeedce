//! CSRF token lookup.
//!
//! The backend is a session-authenticated web app; every state-changing call
//! must echo the `csrftoken` cookie in the `X-CSRFToken` header.

use wasm_bindgen::JsCast;
use web_sys::HtmlDocument;

/// Find `name` in a `document.cookie` string and URI-decode its value.
pub fn find_cookie(cookies: &str, name: &str) -> Option<String> {
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == name).then_some(value)
        })
        .map(|raw| {
            js_sys::decode_uri_component(raw)
                .map(String::from)
                .unwrap_or_else(|_| raw.to_string())
        })
}

/// Read the named cookie from the current page. `None` outside a document
/// or when the cookie is absent.
pub fn read_cookie(name: &str) -> Option<String> {
    let document = web_sys::window()?
        .document()?
        .dyn_into::<HtmlDocument>()
        .ok()?;
    let cookies = document.cookie().ok()?;
    find_cookie(&cookies, name)
}
