//! Microphone capture via `getUserMedia` + `MediaRecorder`.
//!
//! Chunks are buffered as they arrive and joined into a single webm clip on
//! stop. The microphone tracks are always released when a recording ends,
//! whether it was stopped, cancelled, or failed.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use js_sys::{Array, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Blob, BlobEvent, BlobPropertyBag, MediaRecorder, MediaStream, MediaStreamConstraints,
    MediaStreamTrack, Url,
};

use agristar_core::ports::MediaPort;
use agristar_types::{ChatError, Result, attachment::{AUDIO_MIME, AudioClip}};

use crate::backend::js_err;

/// Live recording state. Closures are owned here so they drop with it.
struct Capture {
    stream: MediaStream,
    recorder: MediaRecorder,
    chunks: Rc<RefCell<Vec<Blob>>>,
    _on_data: Closure<dyn FnMut(BlobEvent)>,
}

impl Capture {
    fn release_tracks(&self) {
        let tracks = self.stream.get_tracks();
        for track in tracks.iter() {
            if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                track.stop();
            }
        }
    }
}

#[derive(Default)]
pub struct BrowserMediaRecorder {
    capture: RefCell<Option<Capture>>,
}

impl BrowserMediaRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    async fn open_microphone() -> Result<MediaStream> {
        let window = web_sys::window()
            .ok_or_else(|| ChatError::Media("No window object".to_string()))?;
        let devices = window
            .navigator()
            .media_devices()
            .map_err(|_| ChatError::Permission("microphone is not available here".to_string()))?;

        let constraints = MediaStreamConstraints::new();
        constraints.set_audio(&JsValue::TRUE);
        let promise = devices
            .get_user_media_with_constraints(&constraints)
            .map_err(|e| ChatError::Permission(describe(&e)))?;

        JsFuture::from(promise)
            .await
            .map_err(|e| ChatError::Permission(describe(&e)))?
            .dyn_into::<MediaStream>()
            .map_err(js_err)
    }
}

#[async_trait(?Send)]
impl MediaPort for BrowserMediaRecorder {
    async fn start_recording(&self) -> Result<()> {
        if self.capture.borrow().is_some() {
            return Err(ChatError::InvalidState("recording".to_string()));
        }

        let stream = Self::open_microphone().await?;
        let recorder = match MediaRecorder::new_with_media_stream(&stream) {
            Ok(recorder) => recorder,
            Err(e) => {
                for track in stream.get_tracks().iter() {
                    if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                        track.stop();
                    }
                }
                return Err(ChatError::Media(describe(&e)));
            }
        };

        let chunks = Rc::new(RefCell::new(Vec::new()));
        let sink = chunks.clone();
        let on_data = Closure::<dyn FnMut(BlobEvent)>::new(move |event: BlobEvent| {
            if let Some(blob) = event.data() {
                if blob.size() > 0.0 {
                    sink.borrow_mut().push(blob);
                }
            }
        });
        recorder.set_ondataavailable(Some(on_data.as_ref().unchecked_ref()));

        let capture = Capture {
            stream,
            recorder,
            chunks,
            _on_data: on_data,
        };
        if let Err(e) = capture.recorder.start() {
            capture.release_tracks();
            return Err(ChatError::Media(describe(&e)));
        }

        log::info!("MediaRecorder started");
        *self.capture.borrow_mut() = Some(capture);
        Ok(())
    }

    async fn stop_recording(&self) -> Result<AudioClip> {
        let capture = self
            .capture
            .borrow_mut()
            .take()
            .ok_or_else(|| ChatError::InvalidState("idle".to_string()))?;

        // The final dataavailable fires before stop, so the chunk list is
        // complete once the stop event arrives.
        let (tx, rx) = oneshot::channel::<()>();
        let on_stop = Closure::once(move |_: web_sys::Event| {
            let _ = tx.send(());
        });
        capture
            .recorder
            .set_onstop(Some(on_stop.as_ref().unchecked_ref()));

        if let Err(e) = capture.recorder.stop() {
            capture.release_tracks();
            return Err(ChatError::Media(describe(&e)));
        }
        let stopped = rx.await;
        capture.recorder.set_onstop(None);
        capture.release_tracks();
        stopped.map_err(|_| ChatError::Media("recorder closed without stopping".to_string()))?;

        let parts = Array::new();
        for chunk in capture.chunks.borrow().iter() {
            parts.push(chunk);
        }
        let options = BlobPropertyBag::new();
        options.set_type(AUDIO_MIME);
        let blob = Blob::new_with_blob_sequence_and_options(&parts, &options).map_err(js_err)?;

        let buffer = JsFuture::from(blob.array_buffer()).await.map_err(js_err)?;
        let bytes = Uint8Array::new(&buffer).to_vec();
        let preview_url = Url::create_object_url_with_blob(&blob).map_err(js_err)?;

        log::debug!("Recorded {} chunks, {} bytes", parts.length(), bytes.len());
        Ok(AudioClip::webm(bytes, preview_url))
    }

    fn cancel_recording(&self) {
        if let Some(capture) = self.capture.borrow_mut().take() {
            // stop() still fires a final dataavailable after `_on_data` is gone
            capture.recorder.set_ondataavailable(None);
            let _ = capture.recorder.stop();
            capture.release_tracks();
            log::info!("Recording cancelled");
        }
    }

    fn release_preview(&self, url: &str) {
        if url.starts_with("blob:") {
            let _ = Url::revoke_object_url(url);
        }
    }
}

/// Human-readable text for a rejected DOM promise (`NotAllowedError`, ...).
pub(crate) fn describe(e: &JsValue) -> String {
    e.dyn_ref::<js_sys::Error>()
        .map(|err| String::from(err.message()))
        .filter(|m| !m.is_empty())
        .or_else(|| e.as_string())
        .unwrap_or_else(|| format!("{:?}", e))
}
