//! Chat client core: the input coordinator, the ports it drives, and the
//! event bus it reports through. No browser dependencies.

pub mod coordinator;
pub mod event_bus;
pub mod ports;
pub mod sequence;


pub use coordinator::{ChatInputCoordinator, format_elapsed};
