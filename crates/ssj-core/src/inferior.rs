//! Mirrors the target's observable state: call stack, breakpoints, and the
//! paused/running flag.
//!
//! `Inferior` is a pure state machine — it is mutated only by notification
//! handlers (`on_status`, `on_throw`, `on_log`, `on_detaching`) or by reply
//! handlers of state-changing commands (`add_breakpoint`, `clear_breakpoint`).
//! It never touches the wire itself.

use std::collections::HashMap;

use crate::error::SsjError;

/// The inferior's run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferiorState {
    /// The target is executing; inspect commands are illegal.
    Running,
    /// The target is stopped at a known source location.
    Paused,
    /// The target has disconnected; the session should exit its loop.
    Detached,
}

/// A client-side breakpoint record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    /// Target-assigned id, returned in the reply to the add-breakpoint
    /// request.
    pub id: u32,
    /// Source file the breakpoint is set in.
    pub file_name: String,
    /// 1-based source line.
    pub line: u32,
}

/// A snapshot of one call-stack entry. Invalidated on every resume.
#[derive(Debug, Clone, PartialEq)]
pub struct CallFrame {
    /// The function's name, or an empty string if anonymous/unknown.
    pub function_name: String,
    /// Source file containing the current instruction.
    pub file_name: String,
    /// 1-based source line.
    pub line: u32,
    /// Target-side program counter, opaque to the client.
    pub pc: u32,
}

/// Why the target last stopped, tracked for display purposes only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BreakReason {
    /// No stop has occurred yet, or the reason was not classified.
    #[default]
    Unknown,
    /// Single step (`step`/`stepover`/`stepout`) completed.
    Step,
    /// A breakpoint was hit; carries its id if it could be resolved (see
    /// the stale-id tie-break in [`Inferior::breakpoint_at`]).
    Breakpoint(Option<u32>),
    /// An explicit `pause` command took effect.
    Paused,
    /// A script exception propagated to the top level.
    Throw,
}

/// Details of the last THROW notification.
#[derive(Debug, Clone, PartialEq)]
pub struct ThrowInfo {
    /// Whether the exception was fatal (unhandled).
    pub is_fatal: bool,
    /// The exception's message text.
    pub message: String,
    /// Source file where the throw occurred.
    pub file_name: String,
    /// 1-based source line.
    pub line: u32,
}

/// Mirrors the target's state: run/pause flag, call stack, breakpoints.
#[derive(Debug)]
pub struct Inferior {
    state: InferiorState,
    call_stack: Vec<CallFrame>,
    current_frame_index: usize,
    break_reason: BreakReason,
    last_throw: Option<ThrowInfo>,
    log: Vec<String>,
    breakpoints_by_id: HashMap<u32, Breakpoint>,
    breakpoints_by_location: HashMap<(String, u32), u32>,
}

impl Default for Inferior {
    fn default() -> Self {
        Self::new()
    }
}

impl Inferior {
    /// A freshly-attached inferior: running, no call stack, no breakpoints.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: InferiorState::Running,
            call_stack: Vec::new(),
            current_frame_index: 0,
            break_reason: BreakReason::Unknown,
            last_throw: None,
            log: Vec::new(),
            breakpoints_by_id: HashMap::new(),
            breakpoints_by_location: HashMap::new(),
        }
    }

    /// The current run state.
    #[must_use]
    pub fn state(&self) -> InferiorState {
        self.state
    }

    /// Why the target last stopped.
    #[must_use]
    pub fn break_reason(&self) -> &BreakReason {
        &self.break_reason
    }

    /// Override the last-stop reason, used by the session layer once it has
    /// correlated a STATUS notification's `(file, line)` against the
    /// breakpoint table.
    pub fn set_break_reason(&mut self, reason: BreakReason) {
        self.break_reason = reason;
    }

    /// Details of the most recent THROW notification, if any.
    #[must_use]
    pub fn last_throw(&self) -> Option<&ThrowInfo> {
        self.last_throw.as_ref()
    }

    /// The accumulated log buffer (from LOG notifications).
    #[must_use]
    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// The full call stack, newest (innermost) frame first.
    #[must_use]
    pub fn call_stack(&self) -> &[CallFrame] {
        &self.call_stack
    }

    /// The currently-selected frame's index into [`Inferior::call_stack`].
    #[must_use]
    pub fn current_frame_index(&self) -> usize {
        self.current_frame_index
    }

    /// The currently-selected frame, if any.
    #[must_use]
    pub fn current_frame(&self) -> Option<&CallFrame> {
        self.call_stack.get(self.current_frame_index)
    }

    /// Guard for inspect operations: list locals, eval, get call stack,
    /// switch frame. Legal only while paused.
    ///
    /// # Errors
    /// Returns [`SsjError::NotPaused`] if the target is running.
    pub fn require_paused(&self) -> Result<(), SsjError> {
        if self.state == InferiorState::Paused {
            Ok(())
        } else {
            Err(SsjError::NotPaused)
        }
    }

    /// Apply a STATUS notification: `(is_paused, file_name, line, pc,
    /// function_name)`. Replaces the top frame, sets the pause flag, and
    /// invalidates any prior call-stack cache (the full stack must be
    /// re-fetched via a GetCallStack request once paused).
    pub fn on_status(
        &mut self,
        is_paused: bool,
        file_name: String,
        line: u32,
        pc: u32,
        function_name: String,
    ) {
        self.call_stack.clear();
        self.current_frame_index = 0;
        if is_paused {
            self.state = InferiorState::Paused;
            self.call_stack.push(CallFrame {
                function_name,
                file_name,
                line,
                pc,
            });
        } else {
            self.state = InferiorState::Running;
            self.break_reason = BreakReason::Unknown;
        }
    }

    /// Replace the call stack after a GetCallStack reply. Only meaningful
    /// while paused; the top frame should match the one set by
    /// [`Inferior::on_status`].
    pub fn set_call_stack(&mut self, frames: Vec<CallFrame>) {
        self.current_frame_index = 0;
        self.call_stack = frames;
    }

    /// Apply a THROW notification: `(is_fatal, message, file_name, line)`.
    pub fn on_throw(&mut self, is_fatal: bool, message: String, file_name: String, line: u32) {
        self.last_throw = Some(ThrowInfo {
            is_fatal,
            message,
            file_name,
            line,
        });
        self.break_reason = BreakReason::Throw;
    }

    /// Append a LOG notification's message to the log buffer.
    pub fn on_log(&mut self, message: String) {
        self.log.push(message);
    }

    /// Apply a DETACHING notification: transition to the terminal state.
    pub fn on_detaching(&mut self) {
        self.state = InferiorState::Detached;
    }

    /// Record a breakpoint returned by a successful AddBreak reply in both
    /// indices, keeping them a strict bijection between live ids and
    /// locations: if `id` already names a breakpoint elsewhere (reusing an
    /// id without an intervening clear), that stale location entry is
    /// dropped; if the new location already belongs to a *different* id,
    /// that other id is evicted from `breakpoints_by_id` rather than left
    /// pointing at a location `breakpoints_by_location` no longer agrees
    /// with.
    pub fn add_breakpoint(&mut self, id: u32, file_name: String, line: u32) {
        if let Some(old) = self.breakpoints_by_id.get(&id) {
            self.breakpoints_by_location
                .remove(&(old.file_name.clone(), old.line));
        }
        if let Some(&other_id) = self.breakpoints_by_location.get(&(file_name.clone(), line)) {
            if other_id != id {
                self.breakpoints_by_id.remove(&other_id);
            }
        }
        self.breakpoints_by_location
            .insert((file_name.clone(), line), id);
        self.breakpoints_by_id.insert(
            id,
            Breakpoint {
                id,
                file_name,
                line,
            },
        );
    }

    /// Remove a breakpoint from both indices after a successful ClearBreak
    /// reply.
    pub fn clear_breakpoint(&mut self, id: u32) {
        if let Some(bp) = self.breakpoints_by_id.remove(&id) {
            self.breakpoints_by_location
                .remove(&(bp.file_name, bp.line));
        }
    }

    /// All known breakpoints, for the `breakpoints`/`bp` command.
    #[must_use]
    pub fn breakpoints(&self) -> impl Iterator<Item = &Breakpoint> {
        self.breakpoints_by_id.values()
    }

    /// Resolve `(file, line)` to a breakpoint id, for correlating a STATUS
    /// notification against the breakpoint table. Returns `None` if no
    /// breakpoint is known at that location — including the race where the
    /// target reports a hit for an id whose clear has already been applied
    /// locally; the caller should silently drop the stale id rather than
    /// treat this as an error.
    #[must_use]
    pub fn breakpoint_at(&self, file_name: &str, line: u32) -> Option<u32> {
        self.breakpoints_by_location
            .get(&(file_name.to_string(), line))
            .copied()
    }

    /// Select a frame by index.
    ///
    /// # Errors
    /// Returns [`SsjError::NotPaused`] while running, or
    /// [`SsjError::NotFound`] if `index` is out of range.
    pub fn select_frame(&mut self, index: usize) -> Result<(), SsjError> {
        self.require_paused()?;
        if index >= self.call_stack.len() {
            return Err(SsjError::NotFound {
                what: format!("frame {index}"),
            });
        }
        self.current_frame_index = index;
        Ok(())
    }

    /// Move the selected frame by `delta` (negative moves toward the
    /// innermost frame, i.e. `down`; positive moves toward the outermost,
    /// i.e. `up`).
    ///
    /// # Errors
    /// Returns [`SsjError::NotPaused`] while running, or
    /// [`SsjError::NotFound`] if the result would be out of range.
    pub fn move_frame(&mut self, delta: i32) -> Result<(), SsjError> {
        self.require_paused()?;
        let next = i32::try_from(self.current_frame_index)
            .unwrap_or(i32::MAX)
            .checked_add(delta)
            .filter(|&n| n >= 0)
            .ok_or_else(|| SsjError::NotFound {
                what: "frame out of range".into(),
            })?;
        self.select_frame(usize::try_from(next).unwrap_or(usize::MAX))
    }
}
