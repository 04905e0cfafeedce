pub mod message;
pub mod event;
pub mod attachment;
pub mod config;
pub mod error;
pub mod language;
pub mod session;
pub mod wire;


pub use error::ChatError;
pub type Result<T> = std::result::Result<T, ChatError>;
