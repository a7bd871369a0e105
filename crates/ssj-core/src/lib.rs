//! Session-level protocol state for the SSJ debugger.
//!
//! This crate layers message framing, source caching, and the inferior
//! (target) state machine on top of the wire codec in `ssj-proto`. It knows
//! about sockets (through the [`framer`] module) but nothing about
//! terminals, command parsing, or display formatting — that is `ssj-cli`'s
//! job.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod framer;
pub mod inferior;
pub mod protocol;
pub mod source;

pub use error::SsjError;
pub use framer::{MessageFramer, Notification, PollEvent, Reply};
pub use inferior::{BreakReason, Breakpoint, CallFrame, Inferior, InferiorState, ThrowInfo};
pub use protocol::{CommandId, ParsedNotification};
pub use source::{SourceCache, SourceEntry};
