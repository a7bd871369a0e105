//! Errors produced while decoding or encoding wire bytes.

use std::io;

use thiserror::Error;

/// Errors raised by the [`crate::value`] codec.
///
/// `ProtocolError` is deliberately narrow: it reports only malformed-wire
/// conditions that the codec itself can detect (unknown tags, truncated
/// payloads, invalid pointer widths). Sequencing violations (a REP with no
/// outstanding request, for example) belong to the message framer, one
/// layer up, and are not represented here.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The leading tag byte did not match any known wire form.
    #[error("unknown tag byte {tag:#04x}")]
    UnknownTag {
        /// The offending byte.
        tag: u8,
    },

    /// The stream ended before a complete value could be read.
    #[error("truncated payload: expected {expected} more byte(s)")]
    Truncated {
        /// How many more bytes were needed.
        expected: usize,
    },

    /// A pointer-bearing value declared a width other than 4 or 8.
    #[error("invalid pointer width {width} (must be 4 or 8)")]
    InvalidPointerWidth {
        /// The declared width.
        width: u8,
    },

    /// A STRING/BUF payload was not valid UTF-8 where UTF-8 was required.
    #[error("invalid UTF-8 in STRING payload")]
    InvalidUtf8,

    /// Underlying I/O failure while reading or writing the stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
