#[cfg(test)]
mod tests {
    use crate::format::{Segment, segments};
    use crate::state::*;
    use crate::view::{InputControls, input_controls, show_quick_tips};
    use agristar_types::attachment::{AttachmentPreview, InputMode};
    use agristar_types::config::FeatureFlags;
    use agristar_types::event::{ChatEvent, NoticeLevel};
    use agristar_types::language::Language;
    use agristar_types::message::Message;
    use agristar_types::session::{HistoryEntry, SessionRef};

    fn entry(id: &str, title: &str) -> HistoryEntry {
        HistoryEntry {
            id: id.to_string(),
            title: title.to_string(),
            message_count: None,
        }
    }

    // ─── UiState Tests ───────────────────────────────────────

    #[test]
    fn test_ui_state_initial() {
        let state = UiState::new();
        assert!(state.transcript.is_empty());
        assert_eq!(state.mode, InputMode::Idle);
        assert_eq!(state.status_text, "Ready");
        assert!(state.alert.is_none());
        assert!(!state.is_busy());
    }

    #[test]
    fn test_typing_placeholder_added_and_removed() {
        let mut state = UiState::new();
        let typing = Message::typing();
        let id = typing.local_id.clone();
        state.process_events(
            vec![
                ChatEvent::MessageAppended { message: Message::user("Hello") },
                ChatEvent::MessageAppended { message: typing },
                ChatEvent::RequestStarted { language: Language::En },
            ],
            0.0,
        );
        assert_eq!(state.transcript.len(), 2);
        assert!(state.is_busy());
        assert_eq!(state.status_text, "Thinking...");

        state.process_events(
            vec![
                ChatEvent::MessageRemoved { local_id: id },
                ChatEvent::MessageAppended { message: Message::bot("Hi!") },
                ChatEvent::RequestFinished { success: true },
            ],
            0.0,
        );
        let texts: Vec<&str> = state.transcript.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello", "Hi!"]);
        assert!(!state.is_busy());
        assert_eq!(state.status_text, "Ready");
    }

    #[test]
    fn test_status_follows_language() {
        let mut state = UiState::new();
        state.process_events(
            vec![
                ChatEvent::LanguageChanged { language: Language::Sw },
                ChatEvent::RequestStarted { language: Language::Sw },
            ],
            0.0,
        );
        assert_eq!(state.status_text, "Inajibu...");
        state.process_events(vec![ChatEvent::RequestFinished { success: false }], 0.0);
        assert_eq!(state.status_text, "Tayari");
    }

    #[test]
    fn test_mode_and_preview_projection() {
        let mut state = UiState::new();
        let preview = AttachmentPreview {
            label: "leaf.png (12 KB)".to_string(),
            url: "blob:1".to_string(),
        };
        state.process_events(
            vec![ChatEvent::ModeChanged {
                mode: InputMode::ImageStaged,
                preview: Some(preview.clone()),
            }],
            0.0,
        );
        assert_eq!(state.mode, InputMode::ImageStaged);
        assert_eq!(state.preview, Some(preview));

        state.process_events(
            vec![ChatEvent::ModeChanged { mode: InputMode::Idle, preview: None }],
            0.0,
        );
        assert!(state.preview.is_none());
    }

    #[test]
    fn test_recording_timer() {
        let mut state = UiState::new();
        state.process_events(
            vec![
                ChatEvent::ModeChanged { mode: InputMode::Recording, preview: None },
                ChatEvent::RecordingStarted { started_at_ms: 10_000 },
            ],
            0.0,
        );
        assert_eq!(state.status_text, "Listening...");
        assert_eq!(state.recording_seconds(15_500), Some(5));
        assert_eq!(state.recording_seconds(9_000), Some(0));

        state.process_events(
            vec![ChatEvent::ModeChanged { mode: InputMode::AudioReview, preview: None }],
            0.0,
        );
        assert!(state.recording_seconds(20_000).is_none());
    }

    #[test]
    fn test_load_lifecycle() {
        let mut state = UiState::new();
        state.process_events(vec![ChatEvent::LoadStarted { session_id: "s1".to_string() }], 0.0);
        assert!(state.is_busy());

        state.process_events(
            vec![
                ChatEvent::TranscriptReplaced { messages: vec![Message::user("old question")] },
                ChatEvent::SessionChanged {
                    session: Some(SessionRef::new("s1", Some("Beans"))),
                },
            ],
            0.0,
        );
        assert!(state.loading.is_none());
        assert!(state.is_active("s1"));
        assert_eq!(state.transcript.len(), 1);
    }

    #[test]
    fn test_load_failure_banner() {
        let mut state = UiState::new();
        state.process_events(
            vec![
                ChatEvent::LoadStarted { session_id: "s1".to_string() },
                ChatEvent::LoadFailed {
                    session_id: "s1".to_string(),
                    message: "Network Error".to_string(),
                },
            ],
            0.0,
        );
        assert!(state.loading.is_none());
        assert_eq!(state.load_error.as_deref(), Some("Network Error"));
        assert!(!state.is_busy());
    }

    #[test]
    fn test_load_banner_cleared_by_next_send_in_kept_session() {
        let mut state = UiState::new();
        state.process_events(
            vec![
                ChatEvent::MessageAppended { message: Message::bot("Welcome") },
                ChatEvent::SessionChanged {
                    session: Some(SessionRef::new("s1", Some("Maize"))),
                },
                ChatEvent::LoadStarted { session_id: "s2".to_string() },
                ChatEvent::LoadFailed {
                    session_id: "s2".to_string(),
                    message: "Failed to load history".to_string(),
                },
            ],
            0.0,
        );
        assert!(state.load_error.is_some());
        assert_eq!(state.transcript.len(), 1);

        let typing = Message::typing();
        let typing_id = typing.local_id.clone();
        state.process_events(
            vec![
                ChatEvent::MessageAppended { message: Message::user("Hello") },
                ChatEvent::MessageAppended { message: typing },
                ChatEvent::RequestStarted { language: Language::En },
                ChatEvent::MessageRemoved { local_id: typing_id },
                ChatEvent::MessageAppended { message: Message::bot("Hi!") },
                ChatEvent::RequestFinished { success: true },
            ],
            0.0,
        );
        assert!(state.load_error.is_none());
        assert!(state.is_active("s1"));
        let texts: Vec<&str> = state.transcript.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["Welcome", "Hello", "Hi!"]);
    }

    #[test]
    fn test_dictation_fills_input() {
        let mut state = UiState::new();
        state.input_text = "draft".to_string();
        state.process_events(
            vec![
                ChatEvent::LanguageChanged { language: Language::Sw },
                ChatEvent::DictationStarted { language: Language::Sw },
            ],
            0.0,
        );
        assert!(state.dictating);
        assert_eq!(state.status_text, "Sikiliza...");

        state.process_events(
            vec![ChatEvent::DictationFinished {
                transcript: Some("mahindi yangu yana madoda".to_string()),
            }],
            0.0,
        );
        assert!(!state.dictating);
        assert_eq!(state.input_text, "mahindi yangu yana madoda");
        assert_eq!(state.status_text, "Tayari");
    }

    #[test]
    fn test_silent_dictation_keeps_draft() {
        let mut state = UiState::new();
        state.input_text = "draft".to_string();
        state.process_events(
            vec![
                ChatEvent::DictationStarted { language: Language::En },
                ChatEvent::DictationFinished { transcript: None },
            ],
            0.0,
        );
        assert_eq!(state.input_text, "draft");
        assert_eq!(state.status_text, "Ready");
    }

    #[test]
    fn test_dictation_failure_status() {
        let mut state = UiState::new();
        state.process_events(
            vec![
                ChatEvent::DictationStarted { language: Language::En },
                ChatEvent::DictationFailed { message: "no-speech".to_string() },
            ],
            0.0,
        );
        assert!(!state.dictating);
        assert_eq!(state.status_text, "Voice error");
    }

    #[test]
    fn test_alert_and_dismiss() {
        let mut state = UiState::new();
        state.process_events(
            vec![ChatEvent::Alert { message: "Image too large (max 5MB)".to_string() }],
            0.0,
        );
        assert_eq!(state.alert.as_deref(), Some("Image too large (max 5MB)"));
        state.dismiss_alert();
        assert!(state.alert.is_none());
    }

    #[test]
    fn test_toasts_expire() {
        let mut state = UiState::new();
        state.process_events(
            vec![ChatEvent::Notice {
                level: NoticeLevel::Error,
                message: "Could not delete".to_string(),
            }],
            10.0,
        );
        state.prune_toasts(10.0 + TOAST_SECONDS / 2.0);
        assert_eq!(state.toasts.len(), 1);
        state.prune_toasts(10.0 + TOAST_SECONDS + 0.1);
        assert!(state.toasts.is_empty());
    }

    #[test]
    fn test_rename_draft_dropped_when_entry_deleted() {
        let mut state = UiState::new();
        state.process_events(
            vec![ChatEvent::HistoryChanged { entries: vec![entry("a", "A"), entry("b", "B")] }],
            0.0,
        );
        let a = state.history[0].clone();
        state.begin_rename(&a);
        assert_eq!(state.rename.as_ref().unwrap().title, "A");

        state.process_events(
            vec![ChatEvent::HistoryChanged { entries: vec![entry("b", "B")] }],
            0.0,
        );
        assert!(state.rename.is_none());
    }

    // ─── Input controls ──────────────────────────────────────

    #[test]
    fn test_controls_idle() {
        let c = input_controls(InputMode::Idle, &FeatureFlags::default(), false, false);
        assert!(c.text && c.send && c.attach_image && c.start_recording);
        assert!(!c.recording_bar && !c.audio_review && !c.image_preview);
    }

    #[test]
    fn test_controls_busy_blocks_sending() {
        let c = input_controls(InputMode::Idle, &FeatureFlags::default(), true, false);
        assert!(c.text);
        assert!(!c.send && !c.attach_image && !c.start_recording);
    }

    #[test]
    fn test_controls_image_staged_hides_mic() {
        let c = input_controls(InputMode::ImageStaged, &FeatureFlags::default(), false, false);
        assert!(c.image_preview && c.send);
        assert!(!c.start_recording);
    }

    #[test]
    fn test_controls_recording_only_stop() {
        let c = input_controls(InputMode::Recording, &FeatureFlags::default(), false, false);
        assert_eq!(
            c,
            InputControls {
                recording_bar: true,
                ..InputControls::default()
            }
        );
    }

    #[test]
    fn test_controls_audio_review() {
        let c = input_controls(InputMode::AudioReview, &FeatureFlags::default(), false, false);
        assert!(c.audio_review && c.send_audio);
        assert!(!c.text);
    }

    #[test]
    fn test_controls_respect_feature_flags() {
        let features = FeatureFlags {
            image: false,
            voice: false,
            ..FeatureFlags::default()
        };
        let c = input_controls(InputMode::Idle, &features, false, false);
        assert!(c.send);
        assert!(!c.attach_image && !c.start_recording);
    }

    #[test]
    fn test_controls_dictation() {
        let c = input_controls(InputMode::Idle, &FeatureFlags::default(), false, false);
        assert!(c.dictate);
        let c = input_controls(InputMode::ImageStaged, &FeatureFlags::default(), true, false);
        assert!(c.dictate);
        let c = input_controls(InputMode::AudioReview, &FeatureFlags::default(), false, false);
        assert!(!c.dictate);

        let features = FeatureFlags { dictation: false, ..FeatureFlags::default() };
        assert!(!input_controls(InputMode::Idle, &features, false, false).dictate);
    }

    #[test]
    fn test_controls_no_recording_while_dictating() {
        let c = input_controls(InputMode::Idle, &FeatureFlags::default(), false, true);
        assert!(!c.start_recording);
        assert!(c.dictate && c.send);
    }

    // ─── Quick tips ──────────────────────────────────────────

    #[test]
    fn test_quick_tips_until_first_user_message() {
        let tips = vec!["When should I plant beans?".to_string()];
        let greeting = vec![Message::bot("Hello!")];
        assert!(show_quick_tips(&greeting, &tips));
        assert!(show_quick_tips(&[], &tips));

        let chatted = vec![Message::bot("Hello!"), Message::user("Hi")];
        assert!(!show_quick_tips(&chatted, &tips));
        assert!(!show_quick_tips(&greeting, &[]));
    }

    // ─── Formatting ──────────────────────────────────────────

    fn text(t: &str, bold: bool) -> Segment {
        Segment::Text { text: t.to_string(), bold }
    }

    #[test]
    fn test_segments_plain() {
        assert_eq!(segments("Plant in March"), vec![text("Plant in March", false)]);
        assert!(segments("").is_empty());
    }

    #[test]
    fn test_segments_bold_and_breaks() {
        assert_eq!(
            segments("**Tip:** water early\nthen mulch"),
            vec![
                text("Tip:", true),
                text(" water early", false),
                Segment::LineBreak,
                text("then mulch", false),
            ]
        );
    }

    #[test]
    fn test_segments_unpaired_marker_literal() {
        assert_eq!(
            segments("a **b** c **d"),
            vec![text("a ", false), text("b", true), text(" c **d", false)]
        );
    }

    #[test]
    fn test_segments_crlf() {
        assert_eq!(
            segments("one\r\ntwo"),
            vec![text("one", false), Segment::LineBreak, text("two", false)]
        );
    }
}
