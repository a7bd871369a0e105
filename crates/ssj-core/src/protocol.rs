//! Command and notification kind tags exchanged with the target.
//!
//! The wire format (`ssj-proto`) only specifies how a `Value` is encoded;
//! which integer identifies "step into" versus "add breakpoint" is a
//! convention the client and target must agree on. These constants are that
//! convention for this client; a concrete target implementation would need
//! to use matching values.

use ssj_proto::Value;

use crate::error::SsjError;

/// Command ids sent as the first value of a `REQ` message, immediately
/// after the class marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum CommandId {
    /// Step into the next statement, descending into calls.
    StepInto = 1,
    /// Step over the next statement.
    StepOver = 2,
    /// Step out of the current function.
    StepOut = 3,
    /// Resume execution until the next stop.
    Resume = 4,
    /// Pause a running target.
    Pause = 5,
    /// Fetch the full call stack of the paused target.
    GetCallStack = 6,
    /// Fetch the local variables of a frame.
    GetLocals = 7,
    /// Evaluate an expression in a frame.
    Eval = 8,
    /// Add a breakpoint at `(file, line)`.
    AddBreak = 9,
    /// Clear a breakpoint by id.
    ClearBreak = 10,
    /// Fetch a source file's text.
    GetSource = 11,
    /// Detach from the target.
    Detach = 12,
}

impl CommandId {
    /// This command id as the wire `Value` sent immediately after the
    /// `REQ` marker.
    #[must_use]
    pub fn as_value(self) -> Value {
        Value::Int(self as i32)
    }
}

/// Notification kinds sent as the first value of an `NFY` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
enum NotificationTag {
    Version = 1,
    Status = 2,
    Print = 3,
    Alert = 4,
    Log = 5,
    Throw = 6,
    Detaching = 7,
}

impl NotificationTag {
    fn from_i32(tag: i32) -> Option<Self> {
        match tag {
            1 => Some(Self::Version),
            2 => Some(Self::Status),
            3 => Some(Self::Print),
            4 => Some(Self::Alert),
            5 => Some(Self::Log),
            6 => Some(Self::Throw),
            7 => Some(Self::Detaching),
            _ => None,
        }
    }
}

/// A notification's payload, decoded from the raw `Value` sequence carried
/// by an `NFY` message.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedNotification {
    /// Sent once, immediately after attach.
    Version {
        /// Target engine name.
        engine_name: String,
        /// Target engine version.
        engine_version: String,
        /// Debug protocol/target version.
        target_version: String,
        /// The game being debugged.
        game_name: String,
    },
    /// Execution point changed.
    Status {
        /// Whether the target is now paused.
        is_paused: bool,
        /// Source file of the current instruction.
        file_name: String,
        /// 1-based source line.
        line: u32,
        /// Target-side program counter.
        pc: u32,
        /// Enclosing function name.
        function_name: String,
    },
    /// Forwarded directly to REPL output.
    Print(String),
    /// Forwarded directly to REPL output.
    Alert(String),
    /// Appended to the log buffer.
    Log(String),
    /// A script exception propagated.
    Throw {
        /// Whether the exception was unhandled.
        is_fatal: bool,
        /// The exception's message text.
        message: String,
        /// Source file where the throw occurred.
        file_name: String,
        /// 1-based source line.
        line: u32,
    },
    /// The target is disconnecting.
    Detaching,
}

fn expect_str(values: &[Value], index: usize, what: &'static str) -> Result<String, SsjError> {
    match values.get(index) {
        Some(Value::Str(s)) => Ok(s.clone()),
        _ => Err(SsjError::Protocol(format!("expected STRING for {what}"))),
    }
}

fn expect_int(values: &[Value], index: usize, what: &'static str) -> Result<i32, SsjError> {
    match values.get(index) {
        Some(Value::Int(n)) => Ok(*n),
        _ => Err(SsjError::Protocol(format!("expected INT for {what}"))),
    }
}

fn expect_bool(values: &[Value], index: usize, what: &'static str) -> Result<bool, SsjError> {
    match values.get(index) {
        Some(Value::True) => Ok(true),
        Some(Value::False) => Ok(false),
        _ => Err(SsjError::Protocol(format!("expected boolean for {what}"))),
    }
}

/// Decode an `NFY` message's values into a [`ParsedNotification`].
///
/// # Errors
/// Returns [`SsjError::Protocol`] if the leading tag is unrecognized or a
/// field has the wrong `Value` variant.
pub fn parse_notification(values: &[Value]) -> Result<ParsedNotification, SsjError> {
    let tag = expect_int(values, 0, "notification kind")?;
    let kind = NotificationTag::from_i32(tag)
        .ok_or_else(|| SsjError::Protocol(format!("unknown notification kind {tag}")))?;

    Ok(match kind {
        NotificationTag::Version => ParsedNotification::Version {
            engine_name: expect_str(values, 1, "engine_name")?,
            engine_version: expect_str(values, 2, "engine_version")?,
            target_version: expect_str(values, 3, "target_version")?,
            game_name: expect_str(values, 4, "game_name")?,
        },
        NotificationTag::Status => ParsedNotification::Status {
            is_paused: expect_bool(values, 1, "is_paused")?,
            file_name: expect_str(values, 2, "file_name")?,
            line: expect_int(values, 3, "line")?.max(0) as u32,
            pc: expect_int(values, 4, "pc")?.max(0) as u32,
            function_name: expect_str(values, 5, "function_name")?,
        },
        NotificationTag::Print => ParsedNotification::Print(expect_str(values, 1, "text")?),
        NotificationTag::Alert => ParsedNotification::Alert(expect_str(values, 1, "text")?),
        NotificationTag::Log => ParsedNotification::Log(expect_str(values, 1, "message")?),
        NotificationTag::Throw => ParsedNotification::Throw {
            is_fatal: expect_bool(values, 1, "is_fatal")?,
            message: expect_str(values, 2, "message")?,
            file_name: expect_str(values, 3, "file_name")?,
            line: expect_int(values, 4, "line")?.max(0) as u32,
        },
        NotificationTag::Detaching => ParsedNotification::Detaching,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_notification() {
        let values = vec![
            Value::Int(NotificationTag::Status as i32),
            Value::True,
            Value::Str("main.js".into()),
            Value::Int(42),
            Value::Int(0),
            Value::Str("main".into()),
        ];
        let parsed = parse_notification(&values).unwrap();
        assert_eq!(
            parsed,
            ParsedNotification::Status {
                is_paused: true,
                file_name: "main.js".into(),
                line: 42,
                pc: 0,
                function_name: "main".into(),
            }
        );
    }

    #[test]
    fn unknown_kind_is_protocol_error() {
        let values = vec![Value::Int(99)];
        assert!(matches!(
            parse_notification(&values),
            Err(SsjError::Protocol(_))
        ));
    }
}
