//! Command implementations
//!
//! Each module corresponds to one mode of the CLI.

pub mod listen;
pub mod send_message;

pub use listen::{capture, Captured, ListenOptions, UpdateStream};
pub use send_message::{compose, dispatch, Attachment, OutboundMessage};
