//! Wire-level codec for the SSJ debugger protocol.
//!
//! This crate knows nothing about sockets, sessions, or framing beyond a
//! single message's worth of [`Value`]s and the end-of-message marker. It is
//! the lowest layer: [`crate::value`] defines the tagged union and its
//! big-endian wire encoding, [`crate::class`] defines the four message class
//! markers that share the same leading-byte tag space as values.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod class;
mod error;
pub mod pointer;
pub mod value;

pub use class::MessageClass;
pub use error::ProtocolError;
pub use pointer::Pointer;
pub use value::{Value, WireItem};
