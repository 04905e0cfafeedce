//! WASM-target tests for agristar-core.
//!
//! Drives the coordinator through its public surface under
//! wasm32-unknown-unknown via `wasm-pack test --node`.

use wasm_bindgen_test::*;

use agristar_core::event_bus::EventBus;
use agristar_core::ports::*;
use agristar_core::sequence::RequestSequencer;
use agristar_core::ChatInputCoordinator;
use agristar_types::attachment::{AudioClip, InputMode};
use agristar_types::config::ChatConfig;
use agristar_types::event::ChatEvent;
use agristar_types::language::Language;
use agristar_types::message::{Message, MessageKind, Sender};
use agristar_types::session::HistoryEntry;
use agristar_types::wire::*;
use agristar_types::{ChatError, Result};

use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

// ─── Scripted backend ────────────────────────────────────

#[derive(Default)]
struct ScriptedBackend {
    replies: RefCell<VecDeque<Result<ChatReply>>>,
    sent: RefCell<Vec<String>>,
}

impl ScriptedBackend {
    fn script(replies: Vec<Result<ChatReply>>) -> Rc<Self> {
        Rc::new(Self {
            replies: RefCell::new(replies.into()),
            sent: RefCell::new(Vec::new()),
        })
    }

    fn next(&self) -> Result<ChatReply> {
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ChatError::Network("script exhausted".to_string())))
    }
}

#[async_trait(?Send)]
impl ChatBackendPort for ScriptedBackend {
    async fn send_text(&self, req: TextChatRequest) -> Result<ChatReply> {
        self.sent.borrow_mut().push(format!("text:{}", req.message));
        self.next()
    }

    async fn send_image(&self, req: VisionChatRequest) -> Result<ChatReply> {
        self.sent.borrow_mut().push(format!("vision:{}", req.message));
        self.next()
    }

    async fn send_audio(&self, req: AudioChatRequest) -> Result<ChatReply> {
        self.sent.borrow_mut().push(format!("audio:{}", req.clip.bytes.len()));
        self.next()
    }

    async fn list_sessions(&self) -> Result<Vec<HistoryEntry>> {
        Ok(vec![HistoryEntry {
            id: "7".to_string(),
            title: "Soil pH".to_string(),
            message_count: Some(4),
        }])
    }

    async fn fetch_history(&self, _session_id: &str) -> Result<Vec<Message>> {
        Ok(vec![Message::user("How acidic?"), Message::bot("Around 5.5")])
    }

    async fn rename_session(&self, _session_id: &str, title: &str) -> Result<String> {
        Ok(title.to_string())
    }

    async fn delete_session(&self, _session_id: &str) -> Result<()> {
        Ok(())
    }

    fn cancel_pending(&self) {}
}

struct SilentMedia;

#[async_trait(?Send)]
impl MediaPort for SilentMedia {
    async fn start_recording(&self) -> Result<()> {
        Ok(())
    }

    async fn stop_recording(&self) -> Result<AudioClip> {
        Ok(AudioClip::webm(vec![0u8; 512], "blob:voice"))
    }

    fn cancel_recording(&self) {}

    fn release_preview(&self, _url: &str) {}
}

fn coordinator(backend: Rc<ScriptedBackend>) -> (ChatInputCoordinator, EventBus) {
    let bus = EventBus::new();
    let coord = ChatInputCoordinator::new(
        ChatConfig::default(),
        bus.clone(),
        backend,
        Rc::new(SilentMedia),
        None,
    );
    (coord, bus)
}

fn ok(text: &str, id: Option<&str>) -> Result<ChatReply> {
    Ok(ChatReply {
        response: text.to_string(),
        session_id: id.map(String::from),
        session_title: None,
    })
}

// ─── Coordinator Tests ───────────────────────────────────

#[wasm_bindgen_test]
async fn coordinator_round_trip_text() {
    let backend = ScriptedBackend::script(vec![ok("Hi!", Some("abc"))]);
    let (coord, bus) = coordinator(backend.clone());

    coord.send_text("Hello").await.unwrap();

    assert_eq!(backend.sent.borrow().as_slice(), &["text:Hello".to_string()]);
    assert_eq!(coord.session_id().as_deref(), Some("abc"));
    let last = coord.transcript().last().cloned().unwrap();
    assert_eq!(last.sender, Sender::Bot);
    assert_eq!(last.text, "Hi!");

    let events = bus.drain();
    assert!(events.iter().any(|e| matches!(e, ChatEvent::RequestStarted { language: Language::En })));
    assert!(events.iter().any(|e| matches!(e, ChatEvent::RequestFinished { success: true })));
    assert!(events.iter().any(|e| matches!(e, ChatEvent::MessageRemoved { .. })));
}

#[wasm_bindgen_test]
async fn coordinator_network_error_is_inline() {
    let backend = ScriptedBackend::script(vec![]);
    let (coord, _bus) = coordinator(backend);

    assert!(coord.send_text("Hello").await.is_err());
    let last = coord.transcript().last().cloned().unwrap();
    assert_eq!(last.kind, MessageKind::Error);
    assert_eq!(last.text, "Network error.");
}

#[wasm_bindgen_test]
async fn coordinator_voice_note_flow() {
    let backend = ScriptedBackend::script(vec![ok("Heard you", None)]);
    let (coord, _bus) = coordinator(backend.clone());

    coord.start_recording().await.unwrap();
    assert_eq!(coord.mode(), InputMode::Recording);
    coord.stop_recording().await.unwrap();
    assert_eq!(coord.mode(), InputMode::AudioReview);
    coord.send_audio().await.unwrap();

    assert_eq!(coord.mode(), InputMode::Idle);
    assert_eq!(backend.sent.borrow().as_slice(), &["audio:512".to_string()]);
    assert!(coord
        .transcript()
        .iter()
        .any(|m| m.audio_url.as_deref() == Some("blob:voice")));
}

#[wasm_bindgen_test]
async fn coordinator_history_refresh_and_load() {
    let backend = ScriptedBackend::script(vec![]);
    let (coord, _bus) = coordinator(backend);

    coord.refresh_history().await.unwrap();
    assert_eq!(coord.history().len(), 1);

    coord.load_session("7").await.unwrap();
    let session = coord.session().unwrap();
    assert_eq!(session.title, "Soil pH");
    let texts: Vec<String> = coord.transcript().into_iter().map(|m| m.text).collect();
    assert_eq!(texts, vec!["How acidic?", "Around 5.5"]);
}

#[wasm_bindgen_test]
async fn coordinator_rename_then_delete() {
    let backend = ScriptedBackend::script(vec![]);
    let (coord, _bus) = coordinator(backend);
    coord.refresh_history().await.unwrap();
    coord.load_session("7").await.unwrap();

    coord.rename_session("7", "Liming").await.unwrap();
    assert_eq!(coord.history()[0].title, "Liming");

    coord.delete_session("7").await.unwrap();
    assert!(coord.history().is_empty());
    assert!(coord.session_id().is_none());
    assert_eq!(coord.transcript().len(), 1);
}

// ─── Sequencer Tests ─────────────────────────────────────

#[wasm_bindgen_test]
fn sequencer_releases_in_issue_order() {
    let mut seq = RequestSequencer::new();
    let first = seq.issue();
    let second = seq.issue();
    assert!(seq.complete(second, 2).is_empty());
    assert_eq!(seq.complete(first, 1), vec![1, 2]);
}

#[wasm_bindgen_test]
fn sequencer_invalidate_makes_tickets_stale() {
    let mut seq = RequestSequencer::new();
    let ticket = seq.issue();
    seq.invalidate();
    assert!(seq.complete(ticket, "late").is_empty());
    assert_eq!(seq.outstanding(), 0);
}
