//! Browser adapters for the AgriStar chat client.
//!
//! Each type here implements one port trait from `agristar-core` on top of
//! web-sys: fetch for the backend, `MediaRecorder` for voice notes and the
//! Web Speech API for read-aloud and dictation. The file picker is a free function because
//! the coordinator only ever sees the resulting `ImageFile`.

pub mod backend;
pub mod csrf;
pub mod dictation;
pub mod file_picker;
pub mod recorder;
pub mod speech;

pub use backend::HttpChatBackend;
pub use dictation::BrowserDictation;
pub use file_picker::{ImageSource, pick_image};
pub use recorder::BrowserMediaRecorder;
pub use speech::BrowserSpeech;
