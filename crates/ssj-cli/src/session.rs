//! The Session REPL: dispatches parsed commands to protocol requests and
//! renders replies/notifications as REPL output lines.
//!
//! Mirrors the teacher's action-producing state machine (`App::handle` in
//! the example pack): [`Session::dispatch`] performs no terminal I/O itself,
//! it only talks to the framer and returns the lines the caller should
//! print. The blocking prompt loop lives in [`crate::main`].

use std::io::{Read, Write};

use ssj_core::{CommandId, Inferior, ParsedNotification, PollEvent, Reply, SourceCache, SsjError};
use ssj_proto::Value;
use tracing::{info, warn};

use crate::commands::Command;
use crate::format::format_value;

const DEFAULT_LIST_LINES: usize = 10;

/// Owns the protocol framer and the session's client-side state: the
/// inferior model, the source cache, and the last step-family command (for
/// blank-line repeat).
pub struct Session<R, W> {
    framer: ssj_core::MessageFramer<R, W>,
    inferior: Inferior,
    sources: SourceCache,
    last_step: Option<Command>,
    verbose: bool,
}

impl<R: Read, W: Write> Session<R, W> {
    /// Wrap an already-connected transport.
    pub fn new(framer: ssj_core::MessageFramer<R, W>, verbose: bool) -> Self {
        Self {
            framer,
            inferior: Inferior::new(),
            sources: SourceCache::new(),
            last_step: None,
            verbose,
        }
    }

    /// Whether the session has detached (the prompt loop should exit).
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.inferior.state() == ssj_core::InferiorState::Detached
    }

    /// Render the current frame and prompt, as printed before reading the
    /// next command line.
    #[must_use]
    pub fn render_prompt_context(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(frame) = self.inferior.current_frame() {
            lines.push(format!(
                "{} at {}:{}",
                frame.function_name, frame.file_name, frame.line
            ));
            let text = self
                .sources
                .get(&frame.file_name)
                .map_or("<no source>", |entry| entry.line(frame.line as usize));
            lines.push(format!("  {:<4}  {}", frame.line, text));
        }
        lines
    }

    /// Dispatch one parsed command, sending any necessary protocol request
    /// and draining notifications until its reply (if any) arrives.
    ///
    /// Blank lines repeat the last step-family command; a step-family
    /// command updates that memory.
    ///
    /// # Errors
    /// Returns any [`SsjError`] the protocol layer surfaces; fatal errors
    /// should end the session, non-fatal ones are reported and the loop
    /// continues.
    pub fn dispatch(&mut self, command: Command) -> Result<Vec<String>, SsjError> {
        let command = match command {
            Command::Blank => match self.last_step.clone() {
                Some(step) => step,
                None => return Ok(Vec::new()),
            },
            other => other,
        };

        if command.is_step_family() {
            self.last_step = Some(command.clone());
        }

        match command {
            Command::Step => self.step(CommandId::StepInto),
            Command::StepOver => self.step(CommandId::StepOver),
            Command::StepOut => self.step(CommandId::StepOut),
            Command::Resume => self.step(CommandId::Resume),
            Command::Pause => self.pause(),
            Command::List(n) => self.list(n),
            Command::Backtrace => self.backtrace(),
            Command::Frame(n) => self.select_frame(n),
            Command::Up => self.move_frame(1),
            Command::Down => self.move_frame(-1),
            Command::Locals => self.locals(),
            Command::Eval(expr) => self.eval(&expr),
            Command::Break { file, line } => self.add_breakpoint(file, line),
            Command::Clear(id) => self.clear_breakpoint(id),
            Command::Breakpoints => Ok(self.list_breakpoints()),
            Command::Detach => self.detach(),
            Command::Help => Ok(help_text()),
            Command::Blank => Ok(Vec::new()),
            Command::InvalidArgs { command, reason } => {
                Ok(vec![format!("{command}: {reason}")])
            }
            Command::Unknown(name) => Ok(vec![format!("unknown command '{name}'")]),
        }
    }

    fn step(&mut self, command_id: CommandId) -> Result<Vec<String>, SsjError> {
        self.framer.send_request(command_id as i32, &[])?;
        let (mut lines, reply) = self.await_reply()?;
        lines.extend(self.reply_to_lines(reply)?);
        Ok(lines)
    }

    fn pause(&mut self) -> Result<Vec<String>, SsjError> {
        if self.inferior.state() != ssj_core::InferiorState::Running {
            return Err(SsjError::NotFound {
                what: "pause: target is not running".into(),
            });
        }
        self.framer
            .send_request(CommandId::Pause as i32, &[])?;
        let (mut lines, reply) = self.await_reply()?;
        lines.extend(self.reply_to_lines(reply)?);
        Ok(lines)
    }

    fn list(&self, n: Option<usize>) -> Result<Vec<String>, SsjError> {
        self.inferior.require_paused()?;
        // INVARIANT: `Inferior` only reaches `Paused` via `on_status(true, ..)`,
        // which always pushes a top frame first.
        #[allow(clippy::expect_used)]
        let frame = self
            .inferior
            .current_frame()
            .expect("paused implies a current frame");
        let entry = self.sources.get(&frame.file_name).ok_or_else(|| {
            SsjError::NotFound {
                what: format!("source for {}", frame.file_name),
            }
        })?;
        let span = n.unwrap_or(DEFAULT_LIST_LINES);
        let half = span / 2;
        let start = frame.line.saturating_sub(half as u32).max(1);
        let end = (start + span as u32).min(entry.line_count() as u32 + 1);
        Ok((start..end)
            .map(|line| format!("  {:<4}  {}", line, entry.line(line as usize)))
            .collect())
    }

    fn backtrace(&self) -> Result<Vec<String>, SsjError> {
        self.inferior.require_paused()?;
        Ok(self
            .inferior
            .call_stack()
            .iter()
            .enumerate()
            .map(|(i, frame)| {
                let marker = if i == self.inferior.current_frame_index() {
                    "*"
                } else {
                    " "
                };
                format!(
                    "{marker} #{i} {} at {}:{}",
                    frame.function_name, frame.file_name, frame.line
                )
            })
            .collect())
    }

    fn select_frame(&mut self, index: usize) -> Result<Vec<String>, SsjError> {
        self.inferior.select_frame(index)?;
        Ok(self.render_prompt_context())
    }

    fn move_frame(&mut self, delta: i32) -> Result<Vec<String>, SsjError> {
        self.inferior.move_frame(delta)?;
        Ok(self.render_prompt_context())
    }

    fn locals(&mut self) -> Result<Vec<String>, SsjError> {
        self.inferior.require_paused()?;
        self.framer
            .send_request(CommandId::GetLocals as i32, &[])?;
        let (mut lines, reply) = self.await_reply()?;
        match reply {
            Reply::Ok(values) => {
                lines.extend(values.into_iter().map(|v| format_value(&v, self.verbose)));
                Ok(lines)
            }
            Reply::Err(values) => {
                lines.push(target_error_line(&values));
                Ok(lines)
            }
        }
    }

    fn eval(&mut self, expr: &str) -> Result<Vec<String>, SsjError> {
        self.inferior.require_paused()?;
        self.framer.send_request(
            CommandId::Eval as i32,
            &[Value::Str(expr.to_string())],
        )?;
        let (mut lines, reply) = self.await_reply()?;
        match reply {
            Reply::Ok(values) => {
                lines.push(format!(
                    "= {}",
                    values
                        .first()
                        .map_or_else(|| "undefined".to_string(), |v| format_value(v, self.verbose))
                ));
                Ok(lines)
            }
            Reply::Err(values) => {
                lines.push(target_error_line(&values));
                Ok(lines)
            }
        }
    }

    fn add_breakpoint(&mut self, file: String, line: u32) -> Result<Vec<String>, SsjError> {
        self.framer.send_request(
            CommandId::AddBreak as i32,
            &[Value::Str(file.clone()), Value::Int(i32::try_from(line).unwrap_or(i32::MAX))],
        )?;
        let (mut lines, reply) = self.await_reply()?;
        match reply {
            Reply::Ok(values) => match values.first() {
                Some(Value::Int(id)) => {
                    let id = u32::try_from(*id).unwrap_or(0);
                    self.inferior.add_breakpoint(id, file, line);
                    lines.push(format!("breakpoint {id} set"));
                    Ok(lines)
                }
                _ => Err(SsjError::Protocol(
                    "AddBreak reply did not carry an INT id".into(),
                )),
            },
            Reply::Err(values) => {
                lines.push(target_error_line(&values));
                Ok(lines)
            }
        }
    }

    fn clear_breakpoint(&mut self, id: u32) -> Result<Vec<String>, SsjError> {
        self.framer.send_request(
            CommandId::ClearBreak as i32,
            &[Value::Int(i32::try_from(id).unwrap_or(i32::MAX))],
        )?;
        let (mut lines, reply) = self.await_reply()?;
        match reply {
            Reply::Ok(_) => {
                self.inferior.clear_breakpoint(id);
                lines.push(format!("breakpoint {id} cleared"));
                Ok(lines)
            }
            Reply::Err(values) => {
                lines.push(target_error_line(&values));
                Ok(lines)
            }
        }
    }

    fn list_breakpoints(&self) -> Vec<String> {
        let mut bps: Vec<_> = self.inferior.breakpoints().collect();
        if bps.is_empty() {
            return vec!["No breakpoints.".to_string()];
        }
        bps.sort_by_key(|b| b.id);
        bps.into_iter()
            .map(|b| format!("{} {}:{}", b.id, b.file_name, b.line))
            .collect()
    }

    fn detach(&mut self) -> Result<Vec<String>, SsjError> {
        self.framer
            .send_request(CommandId::Detach as i32, &[])?;
        let (mut lines, _) = self.await_reply()?;
        self.inferior.on_detaching();
        lines.push("detached.".to_string());
        Ok(lines)
    }

    /// Block until the outstanding request's reply arrives, applying any
    /// notifications encountered in between and collecting their display
    /// lines so the caller can print them ahead of the reply's own output
    /// (e.g. a breakpoint-hit `STATUS` notification arriving before the
    /// `resume` request's empty reply).
    fn await_reply(&mut self) -> Result<(Vec<String>, Reply), SsjError> {
        let mut lines = Vec::new();
        loop {
            match self.framer.poll()? {
                PollEvent::Reply(reply) => return Ok((lines, reply)),
                PollEvent::Notification(n) => {
                    if let Some(line) = self.apply_notification(&n.0)? {
                        lines.push(line);
                    }
                }
            }
        }
    }

    /// Block for exactly one notification and apply it. Used once at
    /// session start to consume the target's initial VERSION message; the
    /// transport is expected to be in blocking mode (no read timeout) when
    /// this is called.
    ///
    /// # Errors
    /// Propagates protocol errors, including an unexpected reply.
    pub fn await_notification(&mut self) -> Result<Option<String>, SsjError> {
        match self.framer.poll()? {
            PollEvent::Notification(n) => self.apply_notification(&n.0),
            PollEvent::Reply(_) => Err(SsjError::Protocol(
                "expected a notification, got a reply with no outstanding request".into(),
            )),
        }
    }

    /// Drain and apply any notifications already buffered on the socket,
    /// without blocking for a reply. Called by the prompt loop between
    /// commands so spontaneous notifications (e.g. a fatal THROW) aren't
    /// silently delayed until the next request.
    ///
    /// # Errors
    /// Propagates protocol errors from [`ssj_core::MessageFramer::poll`].
    pub fn drain_notifications(&mut self) -> Result<Vec<String>, SsjError> {
        let mut lines = Vec::new();
        while let Some(n) = self.try_poll_notification()? {
            if let Some(line) = self.apply_notification(&n.0)? {
                lines.push(line);
            }
        }
        Ok(lines)
    }

    fn try_poll_notification(&mut self) -> Result<Option<ssj_core::Notification>, SsjError> {
        // Callers are expected to configure a short read timeout on the
        // underlying transport before invoking this; a timeout surfaces as
        // an `Io` error which we translate to "nothing pending" rather than
        // a fatal condition.
        match self.framer.poll() {
            Ok(PollEvent::Notification(n)) => Ok(Some(n)),
            Ok(PollEvent::Reply(_)) => Err(SsjError::Protocol(
                "unexpected reply with no outstanding request".into(),
            )),
            Err(SsjError::Io(ref e))
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn apply_notification(&mut self, values: &[Value]) -> Result<Option<String>, SsjError> {
        let parsed = ssj_core::protocol::parse_notification(values)?;
        Ok(match parsed {
            ParsedNotification::Version {
                engine_name,
                engine_version,
                target_version,
                game_name,
            } => {
                info!(engine_name, engine_version, target_version, game_name, "attached");
                Some(format!(
                    "attached to {engine_name} {engine_version} (protocol {target_version}), running {game_name}"
                ))
            }
            ParsedNotification::Status {
                is_paused,
                file_name,
                line,
                pc,
                function_name,
            } => {
                let bp_id = self.inferior.breakpoint_at(&file_name, line);
                self.inferior
                    .on_status(is_paused, file_name.clone(), line, pc, function_name);
                if is_paused {
                    self.inferior
                        .set_break_reason(ssj_core::BreakReason::Breakpoint(bp_id));
                    Some(match bp_id {
                        Some(id) => format!("breakpoint {id} hit at {file_name}:{line}"),
                        None => format!("paused at {file_name}:{line}"),
                    })
                } else {
                    None
                }
            }
            ParsedNotification::Print(text) | ParsedNotification::Alert(text) => Some(text),
            ParsedNotification::Log(message) => {
                self.inferior.on_log(message);
                None
            }
            ParsedNotification::Throw {
                is_fatal,
                message,
                file_name,
                line,
            } => {
                self.inferior
                    .on_throw(is_fatal, message.clone(), file_name.clone(), line);
                let prefix = if is_fatal { "fatal exception" } else { "exception" };
                Some(format!("{prefix}: {message} at {file_name}:{line}"))
            }
            ParsedNotification::Detaching => {
                self.inferior.on_detaching();
                warn!("target is detaching");
                Some("target detached".to_string())
            }
        })
    }

    fn reply_to_lines(&self, reply: Reply) -> Result<Vec<String>, SsjError> {
        Ok(match reply {
            Reply::Ok(_) => Vec::new(),
            Reply::Err(values) => vec![target_error_line(&values)],
        })
    }

    /// Insert a freshly-fetched source file into the cache (called by the
    /// caller after issuing a `GetSource` request on a cache miss).
    pub fn cache_source(&mut self, file_name: String, text: String) {
        self.sources.insert(file_name, text);
    }

    /// The file name of the currently-selected frame, if paused and the
    /// source is not yet cached — used by the prompt loop to know when to
    /// issue a `GetSource` request.
    #[must_use]
    pub fn pending_source_fetch(&self) -> Option<String> {
        let frame = self.inferior.current_frame()?;
        if self.sources.get(&frame.file_name).is_none() {
            Some(frame.file_name.clone())
        } else {
            None
        }
    }

    /// Fetch a source file by sending `GetSource` and caching the result.
    /// Returns any notification lines surfaced while waiting for the reply.
    ///
    /// # Errors
    /// Propagates protocol errors.
    pub fn fetch_source(&mut self, file_name: &str) -> Result<Vec<String>, SsjError> {
        self.framer.send_request(
            CommandId::GetSource as i32,
            &[Value::Str(file_name.to_string())],
        )?;
        let (lines, reply) = self.await_reply()?;
        if let Reply::Ok(values) = reply {
            if let Some(Value::Str(text)) = values.into_iter().next() {
                self.cache_source(file_name.to_string(), text);
            }
        }
        Ok(lines)
    }
}

fn target_error_line(values: &[Value]) -> String {
    match values.first() {
        Some(Value::Str(message)) => format!("error: {message}"),
        _ => "error: target reported an error".to_string(),
    }
}

fn help_text() -> Vec<String> {
    vec![
        "step (s)        step into".to_string(),
        "stepover (o)    step over".to_string(),
        "stepout (u)     step out".to_string(),
        "resume (c, go)  resume execution".to_string(),
        "pause           pause a running target".to_string(),
        "list [n] (l)    print source around the current line".to_string(),
        "backtrace (bt)  print the call stack".to_string(),
        "frame N (f)     select frame N".to_string(),
        "up / down       move the selected frame".to_string(),
        "locals          list locals in the selected frame".to_string(),
        "eval EXPR (p)   evaluate an expression".to_string(),
        "break F:L (b)   add a breakpoint".to_string(),
        "clear N         clear a breakpoint".to_string(),
        "breakpoints (bp) list breakpoints".to_string(),
        "detach (quit, q) detach and exit".to_string(),
        "help (h)        this text".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use ssj_proto::MessageClass;

    use super::*;
    use crate::commands::parse;

    fn session_with_incoming(bytes: Vec<u8>) -> Session<Cursor<Vec<u8>>, Vec<u8>> {
        let framer = ssj_core::MessageFramer::new(Cursor::new(bytes), Vec::new());
        Session::new(framer, false)
    }

    fn rep(values: &[Value]) -> Vec<u8> {
        let mut buf = Vec::new();
        MessageClass::Rep.encode(&mut buf).unwrap();
        for v in values {
            v.encode(&mut buf).unwrap();
        }
        ssj_proto::value::encode_eom(&mut buf).unwrap();
        buf
    }

    fn status_notification(is_paused: bool, file: &str, line: i32, function: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        MessageClass::Nfy.encode(&mut buf).unwrap();
        Value::Int(2).encode(&mut buf).unwrap(); // Status tag
        (if is_paused { Value::True } else { Value::False })
            .encode(&mut buf)
            .unwrap();
        Value::Str(file.into()).encode(&mut buf).unwrap();
        Value::Int(line).encode(&mut buf).unwrap();
        Value::Int(0).encode(&mut buf).unwrap();
        Value::Str(function.into()).encode(&mut buf).unwrap();
        ssj_proto::value::encode_eom(&mut buf).unwrap();
        buf
    }

    /// S1 — attach and list breakpoints (empty).
    #[test]
    fn s1_no_breakpoints() {
        let mut session = session_with_incoming(vec![]);
        let lines = session.dispatch(parse("bp")).unwrap();
        assert_eq!(lines, vec!["No breakpoints.".to_string()]);
    }

    /// S2 — add and hit a breakpoint.
    #[test]
    fn s2_add_and_hit_breakpoint() {
        let mut incoming = rep(&[Value::Int(7)]);
        incoming.extend(status_notification(true, "main.js", 42, "main"));
        incoming.extend(rep(&[]));

        let mut session = session_with_incoming(incoming);
        let add_lines = session.dispatch(parse("b main.js:42")).unwrap();
        assert_eq!(add_lines, vec!["breakpoint 7 set".to_string()]);

        let resume_lines = session.dispatch(parse("resume")).unwrap();
        assert_eq!(
            resume_lines,
            vec!["breakpoint 7 hit at main.js:42".to_string()],
            "the STATUS notification seen while awaiting resume's reply surfaces its line"
        );
    }

    /// S4 — evaluate an expression.
    #[test]
    fn s4_eval_expression() {
        let incoming = rep(&[Value::Int(3)]);
        let mut session = session_with_incoming(incoming);
        session.inferior.on_status(true, "main.js".into(), 1, 0, "main".into());
        let lines = session.dispatch(parse("p 1+2")).unwrap();
        assert_eq!(lines, vec!["= 3".to_string()]);
    }

    /// S5 — malformed wire.
    #[test]
    fn s5_malformed_wire_is_fatal() {
        let mut session = session_with_incoming(vec![0xF0]);
        let err = session.dispatch(parse("step")).unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("0xf0"));
    }

    /// S3 — step into a function in a file not yet cached, then fetch and
    /// display its source.
    #[test]
    fn s3_step_into_fetches_source() {
        let mut incoming = status_notification(true, "helper.js", 2, "helper");
        incoming.extend(rep(&[]));
        incoming.extend(rep(&[Value::Str("function helper() {\nreturn 1;\n}\n".into())]));

        let mut session = session_with_incoming(incoming);
        let step_lines = session.dispatch(parse("step")).unwrap();
        assert_eq!(step_lines, vec!["paused at helper.js:2".to_string()]);

        assert_eq!(
            session.pending_source_fetch(),
            Some("helper.js".to_string()),
            "the new frame's file has not been fetched yet"
        );

        let fetch_lines = session.fetch_source("helper.js").unwrap();
        assert!(fetch_lines.is_empty());
        assert_eq!(session.pending_source_fetch(), None);

        let context = session.render_prompt_context();
        assert_eq!(
            context,
            vec![
                "helper at helper.js:2".to_string(),
                "  2     return 1;".to_string(),
            ]
        );
    }

    #[test]
    fn eval_while_running_is_not_paused() {
        let mut session = session_with_incoming(vec![]);
        let err = session.dispatch(parse("p 1")).unwrap_err();
        assert!(matches!(err, SsjError::NotPaused));
    }

    #[test]
    fn blank_line_repeats_last_step_command() {
        let mut incoming = rep(&[]);
        incoming.extend(rep(&[]));
        let mut session = session_with_incoming(incoming);
        session.dispatch(parse("step")).unwrap();
        session.dispatch(parse("")).unwrap();
        assert_eq!(session.last_step, Some(Command::Step));
    }
}
