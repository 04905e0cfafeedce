//! WASM-target tests for agristar-types.
//!
//! Mirrors the native unit tests but runs under wasm32-unknown-unknown
//! via `wasm-pack test --node`.

use wasm_bindgen_test::*;

use agristar_types::attachment::*;
use agristar_types::config::*;
use agristar_types::error::*;
use agristar_types::language::*;
use agristar_types::message::*;
use agristar_types::session::*;
use agristar_types::wire::*;

// ─── Message Tests ───────────────────────────────────────

#[wasm_bindgen_test]
fn message_user_text() {
    let msg = Message::user("Hello");
    assert_eq!(msg.sender, Sender::User);
    assert_eq!(msg.kind, MessageKind::Text);
    assert!(!msg.has_media());
    assert!(!msg.local_id.is_empty());
}

#[wasm_bindgen_test]
fn message_ids_are_unique() {
    assert_ne!(Message::typing().local_id, Message::typing().local_id);
}

#[wasm_bindgen_test]
fn sender_accepts_ai_alias() {
    let s: Sender = serde_json::from_str("\"ai\"").unwrap();
    assert_eq!(s, Sender::Bot);
}

// ─── Wire Tests ──────────────────────────────────────────

#[wasm_bindgen_test]
fn chat_reply_numeric_session_id() {
    let reply: ChatReply =
        serde_json::from_str(r#"{"response":"ok","session_id":42,"session_title":"Beans"}"#).unwrap();
    assert_eq!(reply.session_id.as_deref(), Some("42"));
    assert_eq!(reply.session_title.as_deref(), Some("Beans"));
}

#[wasm_bindgen_test]
fn text_request_sends_null_session() {
    let req = TextChatRequest {
        message: "Hi".to_string(),
        language: Language::Sw,
        session_id: None,
    };
    let v = serde_json::to_value(&req).unwrap();
    assert!(v["session_id"].is_null());
    assert_eq!(v["language"], "sw");
}

#[wasm_bindgen_test]
fn history_response_into_messages() {
    let resp: HistoryResponse = serde_json::from_str(
        r#"{"messages":[{"sender":"user","text":"q","image_url":""},{"sender":"bot","text":"a","audio_url":"/m/a.webm"}]}"#,
    )
    .unwrap();
    let msgs: Vec<Message> = resp.messages.into_iter().map(Message::from).collect();
    assert!(msgs[0].image_url.is_none());
    assert_eq!(msgs[1].sender, Sender::Bot);
    assert_eq!(msgs[1].audio_url.as_deref(), Some("/m/a.webm"));
}

#[wasm_bindgen_test]
fn session_list_accepts_both_keys() {
    let a: SessionListResponse =
        serde_json::from_str(r#"{"conversations":[{"id":1,"title":"A"}]}"#).unwrap();
    let b: SessionListResponse =
        serde_json::from_str(r#"{"sessions":[{"id":"x","title":"B"}]}"#).unwrap();
    assert_eq!(a.conversations[0].id, "1");
    assert_eq!(b.conversations[0].title, "B");
}

// ─── Attachment Tests ────────────────────────────────────

#[wasm_bindgen_test]
fn image_validation_limits() {
    let limits = ImageLimits::default();
    let mut img = ImageFile {
        name: "leaf.png".to_string(),
        mime_type: "image/png".to_string(),
        bytes: vec![0u8; 100],
        preview_url: "blob:x".to_string(),
    };
    assert!(img.validate(&limits).is_ok());

    img.bytes = vec![0u8; MAX_IMAGE_BYTES + 1];
    assert_eq!(
        img.validate(&limits),
        Err(ChatError::Validation("Image too large (max 5MB)".to_string()))
    );

    img.bytes = vec![0u8; 10];
    img.mime_type = "application/pdf".to_string();
    assert!(matches!(img.validate(&limits), Err(ChatError::Validation(_))));
}

// ─── Language Tests ──────────────────────────────────────

#[wasm_bindgen_test]
fn language_detection() {
    assert_eq!(Language::detect("Habari, mahindi yangu"), Language::Sw);
    assert_eq!(Language::detect("My maize leaves are yellow"), Language::En);
    assert_eq!(Language::Sw.speech_locale(), "sw-KE");
}

// ─── Session Tests ───────────────────────────────────────

#[wasm_bindgen_test]
fn session_history_insert_front_dedupes() {
    let mut history = SessionHistory::new();
    let entry = HistoryEntry {
        id: "a".to_string(),
        title: DEFAULT_SESSION_TITLE.to_string(),
        message_count: None,
    };
    assert!(history.insert_front(entry.clone()));
    assert!(!history.insert_front(entry));
    assert_eq!(history.len(), 1);
}

// ─── Config Tests ────────────────────────────────────────

#[wasm_bindgen_test]
fn config_urls() {
    let config = ChatConfig::default();
    assert_eq!(config.chat_url(), "/ai/chat/");
    assert_eq!(config.session_url("9"), "/ai/history/9/");
    assert_eq!(ChatConfig::public_widget().chat_url(), "/ai/public-chat/");
}

// ─── Error Tests ─────────────────────────────────────────

#[wasm_bindgen_test]
fn error_display() {
    let e = ChatError::Permission("NotAllowedError".to_string());
    assert_eq!(e.to_string(), "Microphone access failed: NotAllowedError");
    let s = ChatError::Server { status: 500, message: Some("boom".to_string()) };
    assert_eq!(s.server_message(), Some("boom"));
}
