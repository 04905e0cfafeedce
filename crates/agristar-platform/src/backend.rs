//! HTTP adapter for the assistant backend.
//!
//! Text chat and rename are JSON; vision and voice are multipart uploads.
//! Uses browser `fetch()` via gloo-net. Every call carries the CSRF header,
//! and chat requests hold an `AbortController` so a new conversation can
//! cut off a reply that is still streaming in.

use std::cell::RefCell;

use async_trait::async_trait;
use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsValue;
use web_sys::{AbortController, AbortSignal, Blob, BlobPropertyBag, FormData};

use agristar_core::ports::ChatBackendPort;
use agristar_types::{
    ChatError, Result,
    attachment::AUDIO_FILE_NAME,
    config::{ChatConfig, CsrfConfig},
    language::Language,
    message::Message,
    session::HistoryEntry,
    wire::*,
};

use crate::csrf;

pub struct HttpChatBackend {
    config: ChatConfig,
    pending: RefCell<Option<AbortController>>,
}

impl HttpChatBackend {
    pub fn new(config: ChatConfig) -> Self {
        Self {
            config,
            pending: RefCell::new(None),
        }
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let token = csrf::read_cookie(&self.config.csrf.cookie_name);
        with_csrf(builder, &self.config.csrf, token.as_deref())
    }

    /// Fresh abort signal for a chat request, aborting any previous one.
    fn arm_abort(&self) -> Option<AbortSignal> {
        let controller = AbortController::new().ok()?;
        let signal = controller.signal();
        if let Some(previous) = self.pending.replace(Some(controller)) {
            previous.abort();
        }
        Some(signal)
    }

    fn disarm(&self, signal: Option<&AbortSignal>) {
        let mut pending = self.pending.borrow_mut();
        let same = match (pending.as_ref(), signal) {
            (Some(controller), Some(signal)) => controller.signal() == *signal,
            _ => false,
        };
        if same {
            pending.take();
        }
    }

    async fn exchange(&self, request: Request, signal: Option<AbortSignal>) -> Result<ChatReply> {
        let sent = request.send().await;
        self.disarm(signal.as_ref());

        let response = match sent {
            Ok(response) => response,
            Err(_) if signal.as_ref().is_some_and(AbortSignal::aborted) => {
                log::debug!("Chat request aborted");
                return Err(ChatError::Cancelled);
            }
            Err(e) => return Err(ChatError::Network(e.to_string())),
        };
        read_json(response).await
    }

    fn multipart(&self, url: &str, form: FormData, signal: Option<&AbortSignal>) -> Result<Request> {
        self.authorized(Request::post(url))
            .abort_signal(signal)
            .body(JsValue::from(form))
            .map_err(|e| ChatError::JsInterop(e.to_string()))
    }
}

#[async_trait(?Send)]
impl ChatBackendPort for HttpChatBackend {
    async fn send_text(&self, req: TextChatRequest) -> Result<ChatReply> {
        let signal = self.arm_abort();
        let request = self
            .authorized(Request::post(&self.config.chat_url()))
            .abort_signal(signal.as_ref())
            .json(&req)
            .map_err(|e| ChatError::Serialization(e.to_string()))?;
        log::debug!("POST {} ({} chars)", self.config.chat_url(), req.message.len());
        self.exchange(request, signal).await
    }

    async fn send_image(&self, req: VisionChatRequest) -> Result<ChatReply> {
        let form = vision_form(&req)?;
        let signal = self.arm_abort();
        let url = self.config.vision_url();
        let request = self.multipart(&url, form, signal.as_ref())?;
        log::debug!("POST {} ({} byte image)", url, req.image.bytes.len());
        self.exchange(request, signal).await
    }

    async fn send_audio(&self, req: AudioChatRequest) -> Result<ChatReply> {
        let form = audio_form(&req)?;
        let signal = self.arm_abort();
        let url = self.config.voice_url();
        let request = self.multipart(&url, form, signal.as_ref())?;
        log::debug!("POST {} ({} byte clip)", url, req.clip.bytes.len());
        self.exchange(request, signal).await
    }

    async fn list_sessions(&self) -> Result<Vec<HistoryEntry>> {
        let response = self
            .authorized(Request::get(&self.config.history_url()))
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;
        let list: SessionListResponse = read_json(response).await?;
        Ok(list.conversations)
    }

    async fn fetch_history(&self, session_id: &str) -> Result<Vec<Message>> {
        let response = self
            .authorized(Request::get(&self.config.session_url(session_id)))
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;
        let history: HistoryResponse = read_json(response).await?;
        Ok(history.messages.into_iter().map(Message::from).collect())
    }

    async fn rename_session(&self, session_id: &str, title: &str) -> Result<String> {
        let body = RenameRequest {
            title: title.to_string(),
        };
        let response = self
            .authorized(Request::put(&self.config.session_url(session_id)))
            .json(&body)
            .map_err(|e| ChatError::Serialization(e.to_string()))?
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;
        let renamed: RenameResponse = read_json(response).await?;
        Ok(renamed.title)
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        let response = self
            .authorized(Request::delete(&self.config.session_url(session_id)))
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;
        if !response.ok() {
            return Err(server_error(response).await);
        }
        Ok(())
    }

    fn cancel_pending(&self) {
        if let Some(controller) = self.pending.borrow_mut().take() {
            log::debug!("Aborting in-flight chat request");
            controller.abort();
        }
    }
}

// ─── Request bodies ──────────────────────────────────────────

/// Attach the CSRF header when a token is available.
pub fn with_csrf(builder: RequestBuilder, csrf: &CsrfConfig, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => builder.header(&csrf.header_name, token),
        None => {
            log::warn!("No {} cookie; sending without CSRF header", csrf.cookie_name);
            builder
        }
    }
}

/// `image` file part plus `message`, `language` and, for a known
/// conversation, `session_id`.
pub fn vision_form(req: &VisionChatRequest) -> Result<FormData> {
    let form = FormData::new().map_err(js_err)?;
    let blob = blob_from_bytes(&req.image.bytes, &req.image.mime_type)?;
    form.append_with_blob_and_filename("image", &blob, &req.image.name)
        .map_err(js_err)?;
    form.append_with_str("message", &req.message).map_err(js_err)?;
    append_context(&form, req.language, req.session_id.as_deref())?;
    Ok(form)
}

/// `audio` file part named `recording.webm` plus `language` and the
/// optional `session_id`.
pub fn audio_form(req: &AudioChatRequest) -> Result<FormData> {
    let form = FormData::new().map_err(js_err)?;
    let blob = blob_from_bytes(&req.clip.bytes, &req.clip.mime_type)?;
    form.append_with_blob_and_filename("audio", &blob, AUDIO_FILE_NAME)
        .map_err(js_err)?;
    append_context(&form, req.language, req.session_id.as_deref())?;
    Ok(form)
}

fn append_context(form: &FormData, language: Language, session_id: Option<&str>) -> Result<()> {
    form.append_with_str("language", language.tag()).map_err(js_err)?;
    if let Some(id) = session_id {
        form.append_with_str("session_id", id).map_err(js_err)?;
    }
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    if !response.ok() {
        return Err(server_error(response).await);
    }
    response
        .json()
        .await
        .map_err(|e| ChatError::Serialization(e.to_string()))
}

/// Non-2xx status, keeping the `{error}` message when the body has one.
async fn server_error(response: Response) -> ChatError {
    let status = response.status();
    let body: ErrorBody = response.json().await.unwrap_or_default();
    log::warn!("{} returned HTTP {}", response.url(), status);
    ChatError::Server {
        status,
        message: body.error,
    }
}

pub(crate) fn blob_from_bytes(bytes: &[u8], mime_type: &str) -> Result<Blob> {
    let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
    let options = BlobPropertyBag::new();
    options.set_type(mime_type);
    Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(js_err)
}

pub(crate) fn js_err(e: JsValue) -> ChatError {
    ChatError::JsInterop(format!("{:?}", e))
}
