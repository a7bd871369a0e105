//! Session-level error taxonomy.

use std::io;

use thiserror::Error;

/// Errors surfaced during a debug session.
///
/// The fatal/non-fatal split mirrors how the REPL handles each: fatal
/// variants unwind out of the command loop and end the session; the rest are
/// reported on one line and the loop continues.
#[derive(Error, Debug)]
pub enum SsjError {
    /// Socket or terminal I/O failure. Fatal.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The wire codec rejected a byte sequence. Fatal.
    #[error("protocol error: {0}")]
    MalformedWire(#[from] ssj_proto::ProtocolError),

    /// A class/sequence violation at the framing layer. Fatal.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// An inspect command was issued while the target is running. Non-fatal.
    #[error("not paused")]
    NotPaused,

    /// A second request was attempted while one was already outstanding.
    /// Non-fatal (and indicates a REPL bug, since the REPL is single
    /// threaded and should never race itself).
    #[error("busy: a request is already outstanding")]
    Busy,

    /// A source file, breakpoint id, or frame index was not found.
    #[error("not found: {what}")]
    NotFound {
        /// What was missing.
        what: String,
    },
}

impl SsjError {
    /// Whether this error is fatal to the session (should end the command
    /// loop) as opposed to being reported and continued past.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Io(_) | Self::MalformedWire(_) | Self::Protocol(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_and_io_errors_are_fatal() {
        assert!(SsjError::Protocol("bad sequence".into()).is_fatal());
        assert!(SsjError::Io(io::Error::from(io::ErrorKind::BrokenPipe)).is_fatal());
    }

    #[test]
    fn session_errors_are_not_fatal() {
        assert!(!SsjError::NotPaused.is_fatal());
        assert!(!SsjError::Busy.is_fatal());
        assert!(!SsjError::NotFound { what: "frame 3".into() }.is_fatal());
    }
}
