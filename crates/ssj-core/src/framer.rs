//! Groups wire values into logical messages, pairs requests with replies,
//! and surfaces notifications.
//!
//! `MessageFramer` owns the socket and is the only component that reads or
//! writes it; there is no locking because the session is single-threaded
//! (see the crate's concurrency model).

use std::io::{Read, Write};
use std::time::Instant;

use ssj_proto::{MessageClass, Value, WireItem};
use tracing::{trace, warn};

use crate::error::SsjError;

/// A successful (`REP`) or target-side error (`ERR`) reply to the one
/// outstanding request.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// `REP`: the request succeeded, carrying its result values.
    Ok(Vec<Value>),
    /// `ERR`: the target rejected the request, carrying its error values.
    Err(Vec<Value>),
}

/// An unsolicited `NFY` message from the target.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification(pub Vec<Value>);

/// The result of one [`MessageFramer::poll`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    /// The reply to the outstanding request arrived.
    Reply(Reply),
    /// A notification arrived; the outstanding request, if any, is
    /// unaffected.
    Notification(Notification),
}

struct PendingRequest {
    command_id: i32,
    issued_at: Instant,
}

/// Frames a byte stream into messages and demultiplexes replies from
/// notifications.
///
/// Generic over the underlying transport so tests can substitute an
/// in-memory duplex pipe for a real `TcpStream`.
pub struct MessageFramer<R, W> {
    reader: R,
    writer: W,
    pending: Option<PendingRequest>,
}

impl<R: Read, W: Write> MessageFramer<R, W> {
    /// Wrap a reader/writer pair (typically the two halves of a socket).
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            pending: None,
        }
    }

    /// Whether a request is currently awaiting its reply.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Send a request: `REQ` marker, `command_id`, `args`, then EOM.
    ///
    /// # Errors
    /// Returns [`SsjError::Busy`] if a request is already outstanding, or an
    /// I/O error on write failure.
    pub fn send_request(&mut self, command_id: i32, args: &[Value]) -> Result<(), SsjError> {
        if self.pending.is_some() {
            return Err(SsjError::Busy);
        }
        MessageClass::Req.encode(&mut self.writer)?;
        Value::Int(command_id).encode(&mut self.writer)?;
        for arg in args {
            arg.encode(&mut self.writer)?;
        }
        ssj_proto::value::encode_eom(&mut self.writer)?;
        self.pending = Some(PendingRequest {
            command_id,
            issued_at: Instant::now(),
        });
        trace!(command_id, "sent request");
        Ok(())
    }

    /// Read one fully-assembled message and return either the reply to the
    /// outstanding request or a notification.
    ///
    /// # Errors
    /// Returns [`SsjError::MalformedWire`] on a codec failure, or
    /// [`SsjError::Protocol`] if the message stream violates the framing
    /// rules (a `REP`/`ERR` with no outstanding request, a `REQ` from the
    /// target, or a class byte outside `{REP, ERR, NFY}` at message head).
    pub fn poll(&mut self) -> Result<PollEvent, SsjError> {
        let class = match ssj_proto::value::decode_item(&mut self.reader)? {
            WireItem::Class(class) => class,
            WireItem::Eom => {
                return Err(SsjError::Protocol(
                    "message began with EOM, expected a class marker".into(),
                ));
            }
            WireItem::Value(_) => {
                return Err(SsjError::Protocol(
                    "message began with a value, expected a class marker".into(),
                ));
            }
        };

        let values = self.read_values_until_eom()?;

        match class {
            MessageClass::Req => Err(SsjError::Protocol(
                "received REQ from target".into(),
            )),
            MessageClass::Rep => {
                self.complete_pending(class)?;
                Ok(PollEvent::Reply(Reply::Ok(values)))
            }
            MessageClass::Err => {
                self.complete_pending(class)?;
                Ok(PollEvent::Reply(Reply::Err(values)))
            }
            MessageClass::Nfy => Ok(PollEvent::Notification(Notification(values))),
        }
    }

    fn complete_pending(&mut self, class: MessageClass) -> Result<(), SsjError> {
        let pending = self.pending.take().ok_or_else(|| {
            SsjError::Protocol(format!("{class:?} received with no outstanding request"))
        })?;
        trace!(
            command_id = pending.command_id,
            elapsed_ms = pending.issued_at.elapsed().as_millis(),
            "reply paired"
        );
        Ok(())
    }

    fn read_values_until_eom(&mut self) -> Result<Vec<Value>, SsjError> {
        let mut values = Vec::new();
        loop {
            match ssj_proto::value::decode_item(&mut self.reader)? {
                WireItem::Eom => return Ok(values),
                WireItem::Value(v) => values.push(v),
                WireItem::Class(class) => {
                    warn!(?class, "unexpected class marker mid-message");
                    return Err(SsjError::Protocol(format!(
                        "unexpected class marker {class:?} mid-message"
                    )));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn framer_with_incoming(bytes: Vec<u8>) -> MessageFramer<Cursor<Vec<u8>>, Vec<u8>> {
        MessageFramer::new(Cursor::new(bytes), Vec::new())
    }

    #[test]
    fn send_request_then_busy() {
        let mut framer = framer_with_incoming(vec![]);
        framer.send_request(1, &[]).unwrap();
        assert!(framer.is_busy());
        assert!(matches!(
            framer.send_request(2, &[]),
            Err(SsjError::Busy)
        ));
    }

    #[test]
    fn reply_pairs_with_outstanding_request() {
        let mut incoming = Vec::new();
        MessageClass::Rep.encode(&mut incoming).unwrap();
        Value::Int(3).encode(&mut incoming).unwrap();
        ssj_proto::value::encode_eom(&mut incoming).unwrap();

        let mut framer = framer_with_incoming(incoming);
        framer.send_request(7, &[]).unwrap();
        let event = framer.poll().unwrap();
        assert_eq!(event, PollEvent::Reply(Reply::Ok(vec![Value::Int(3)])));
        assert!(!framer.is_busy());
    }

    #[test]
    fn notification_does_not_consume_reply_slot() {
        let mut incoming = Vec::new();
        MessageClass::Nfy.encode(&mut incoming).unwrap();
        Value::Str("log line".into()).encode(&mut incoming).unwrap();
        ssj_proto::value::encode_eom(&mut incoming).unwrap();
        MessageClass::Rep.encode(&mut incoming).unwrap();
        Value::Int(1).encode(&mut incoming).unwrap();
        ssj_proto::value::encode_eom(&mut incoming).unwrap();

        let mut framer = framer_with_incoming(incoming);
        framer.send_request(9, &[]).unwrap();

        let nfy = framer.poll().unwrap();
        assert!(matches!(nfy, PollEvent::Notification(_)));
        assert!(framer.is_busy(), "notification must not consume reply slot");

        let rep = framer.poll().unwrap();
        assert_eq!(rep, PollEvent::Reply(Reply::Ok(vec![Value::Int(1)])));
        assert!(!framer.is_busy());
    }

    #[test]
    fn reply_with_no_outstanding_request_is_protocol_error() {
        let mut incoming = Vec::new();
        MessageClass::Rep.encode(&mut incoming).unwrap();
        ssj_proto::value::encode_eom(&mut incoming).unwrap();

        let mut framer = framer_with_incoming(incoming);
        let err = framer.poll().unwrap_err();
        assert!(matches!(err, SsjError::Protocol(_)));
    }

    #[test]
    fn req_from_target_is_protocol_error() {
        let mut incoming = Vec::new();
        MessageClass::Req.encode(&mut incoming).unwrap();
        ssj_proto::value::encode_eom(&mut incoming).unwrap();

        let mut framer = framer_with_incoming(incoming);
        let err = framer.poll().unwrap_err();
        assert!(matches!(err, SsjError::Protocol(_)));
    }
}
