//! Speech-to-text through the Web Speech API.
//!
//! Chrome only exposes the prefixed `webkitSpeechRecognition`, so the
//! constructor is looked up by name instead of going through
//! `SpeechRecognition::new`. One utterance per `listen` call; the handlers
//! live until the recognizer settles and are detached afterwards.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use js_sys::{Array, Function, Reflect};
use wasm_bindgen::prelude::*;
use web_sys::{
    Event, SpeechRecognition, SpeechRecognitionError, SpeechRecognitionErrorCode,
    SpeechRecognitionEvent,
};

use agristar_core::ports::DictationPort;
use agristar_types::{ChatError, Result, language::Language};

use crate::recorder::describe;

type Outcome = Result<Option<String>>;
type Reply = Rc<RefCell<Option<oneshot::Sender<Outcome>>>>;

const CONSTRUCTORS: [&str; 2] = ["SpeechRecognition", "webkitSpeechRecognition"];

struct Listeners {
    _on_result: Closure<dyn FnMut(SpeechRecognitionEvent)>,
    _on_error: Closure<dyn FnMut(SpeechRecognitionError)>,
    _on_end: Closure<dyn FnMut(Event)>,
}

pub struct BrowserDictation {
    recognition: SpeechRecognition,
    listeners: RefCell<Option<Listeners>>,
}

impl BrowserDictation {
    /// `None` when the browser has no speech recognition.
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let constructor = CONSTRUCTORS
            .iter()
            .filter_map(|name| Reflect::get(&window, &JsValue::from_str(name)).ok())
            .find_map(|value| value.dyn_into::<Function>().ok())?;
        let recognition = match Reflect::construct(&constructor, &Array::new()) {
            Ok(instance) => instance.unchecked_into::<SpeechRecognition>(),
            Err(e) => {
                log::warn!("Cannot create speech recognizer: {}", describe(&e));
                return None;
            }
        };
        recognition.set_continuous(false);
        recognition.set_interim_results(false);
        Some(Self {
            recognition,
            listeners: RefCell::new(None),
        })
    }

    fn detach(&self) {
        self.recognition.set_onresult(None);
        self.recognition.set_onerror(None);
        self.recognition.set_onend(None);
        self.listeners.borrow_mut().take();
    }
}

#[async_trait(?Send)]
impl DictationPort for BrowserDictation {
    async fn listen(&self, language: Language) -> Result<Option<String>> {
        if self.listeners.borrow().is_some() {
            return Err(ChatError::Busy);
        }

        let (tx, rx) = oneshot::channel::<Outcome>();
        let reply: Reply = Rc::new(RefCell::new(Some(tx)));

        let on_result = {
            let reply = reply.clone();
            Closure::<dyn FnMut(SpeechRecognitionEvent)>::new(move |event: SpeechRecognitionEvent| {
                settle(&reply, Ok(first_transcript(&event)));
            })
        };
        let on_error = {
            let reply = reply.clone();
            Closure::<dyn FnMut(SpeechRecognitionError)>::new(move |event: SpeechRecognitionError| {
                settle(&reply, Err(recognition_error(event.error())));
            })
        };
        let on_end = {
            let reply = reply.clone();
            Closure::<dyn FnMut(Event)>::new(move |_: Event| settle(&reply, Ok(None)))
        };

        self.recognition.set_lang(language.speech_locale());
        self.recognition.set_onresult(Some(on_result.as_ref().unchecked_ref()));
        self.recognition.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        self.recognition.set_onend(Some(on_end.as_ref().unchecked_ref()));
        *self.listeners.borrow_mut() = Some(Listeners {
            _on_result: on_result,
            _on_error: on_error,
            _on_end: on_end,
        });

        if let Err(e) = self.recognition.start() {
            self.detach();
            return Err(ChatError::Media(describe(&e)));
        }
        log::debug!("Listening ({})", language.speech_locale());

        let outcome = rx.await.unwrap_or(Err(ChatError::Cancelled));
        self.detach();
        outcome
    }

    fn stop(&self) {
        self.recognition.stop();
    }

    fn cancel(&self) {
        self.recognition.abort();
    }
}

/// Deliver the first outcome; later events (`end` after `result`) are ignored.
fn settle(reply: &Reply, outcome: Outcome) {
    if let Some(tx) = reply.borrow_mut().take() {
        let _ = tx.send(outcome);
    }
}

fn first_transcript(event: &SpeechRecognitionEvent) -> Option<String> {
    let alternative = event.results()?.get(0)?.get(0)?;
    Some(alternative.transcript()).filter(|t| !t.trim().is_empty())
}

/// Map a recognizer error code onto the chat error it surfaces as.
pub fn recognition_error(code: SpeechRecognitionErrorCode) -> ChatError {
    match code {
        SpeechRecognitionErrorCode::Aborted => ChatError::Cancelled,
        SpeechRecognitionErrorCode::NotAllowed | SpeechRecognitionErrorCode::ServiceNotAllowed => {
            ChatError::Permission("Permission denied".to_string())
        }
        SpeechRecognitionErrorCode::NoSpeech => ChatError::Media("no speech detected".to_string()),
        other => ChatError::Media(format!("speech recognition failed ({:?})", other)),
    }
}
