//! Parses a REPL input line into a [`Command`].

/// One parsed REPL command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `step` / `s`
    Step,
    /// `stepover` / `o`
    StepOver,
    /// `stepout` / `u`
    StepOut,
    /// `resume` / `c` / `go`
    Resume,
    /// `pause`
    Pause,
    /// `list [n]` / `l [n]`
    List(Option<usize>),
    /// `backtrace` / `bt`
    Backtrace,
    /// `frame N` / `f N`
    Frame(usize),
    /// `up`
    Up,
    /// `down`
    Down,
    /// `locals`
    Locals,
    /// `eval EXPR` / `p EXPR`
    Eval(String),
    /// `break FILE:LINE` / `b FILE:LINE`
    Break {
        /// Source file.
        file: String,
        /// 1-based source line.
        line: u32,
    },
    /// `clear N`
    Clear(u32),
    /// `breakpoints` / `bp`
    Breakpoints,
    /// `detach` / `quit` / `q`
    Detach,
    /// `help` / `h`
    Help,
    /// A blank line: repeat the last step-family command if any.
    Blank,
    /// A recognized command with arguments that failed to parse.
    InvalidArgs {
        /// The command name as typed.
        command: String,
        /// Why the arguments were rejected.
        reason: String,
    },
    /// An unrecognized command name.
    Unknown(String),
}

impl Command {
    /// Whether this command belongs to the "step family" eligible for
    /// blank-line repeat.
    #[must_use]
    pub fn is_step_family(&self) -> bool {
        matches!(self, Self::Step | Self::StepOver | Self::StepOut)
    }
}

/// Parse one line of REPL input.
#[must_use]
pub fn parse(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Blank;
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or_default().trim();

    match name {
        "step" | "s" => Command::Step,
        "stepover" | "o" => Command::StepOver,
        "stepout" | "u" => Command::StepOut,
        "resume" | "c" | "go" => Command::Resume,
        "pause" => Command::Pause,
        "list" | "l" => parse_list(name, rest),
        "backtrace" | "bt" => Command::Backtrace,
        "frame" | "f" => parse_frame(name, rest),
        "up" => Command::Up,
        "down" => Command::Down,
        "locals" => Command::Locals,
        "eval" | "p" => {
            if rest.is_empty() {
                Command::InvalidArgs {
                    command: name.to_string(),
                    reason: "expected an expression".into(),
                }
            } else {
                Command::Eval(rest.to_string())
            }
        }
        "break" | "b" => parse_break(name, rest),
        "clear" => parse_clear(rest),
        "breakpoints" | "bp" => Command::Breakpoints,
        "detach" | "quit" | "q" => Command::Detach,
        "help" | "h" => Command::Help,
        other => Command::Unknown(other.to_string()),
    }
}

fn parse_list(name: &str, rest: &str) -> Command {
    if rest.is_empty() {
        return Command::List(None);
    }
    match rest.parse::<usize>() {
        Ok(n) => Command::List(Some(n)),
        Err(_) => Command::InvalidArgs {
            command: name.to_string(),
            reason: format!("expected a line count, got '{rest}'"),
        },
    }
}

fn parse_frame(name: &str, rest: &str) -> Command {
    match rest.parse::<usize>() {
        Ok(n) => Command::Frame(n),
        Err(_) => Command::InvalidArgs {
            command: name.to_string(),
            reason: format!("expected a frame index, got '{rest}'"),
        },
    }
}

fn parse_break(name: &str, rest: &str) -> Command {
    let Some((file, line_str)) = rest.rsplit_once(':') else {
        return Command::InvalidArgs {
            command: name.to_string(),
            reason: "expected FILE:LINE".into(),
        };
    };
    match line_str.parse::<u32>() {
        Ok(line) if !file.is_empty() => Command::Break {
            file: file.to_string(),
            line,
        },
        _ => Command::InvalidArgs {
            command: name.to_string(),
            reason: "expected FILE:LINE".into(),
        },
    }
}

fn parse_clear(rest: &str) -> Command {
    match rest.parse::<u32>() {
        Ok(id) => Command::Clear(id),
        Err(_) => Command::InvalidArgs {
            command: "clear".to_string(),
            reason: format!("expected a breakpoint id, got '{rest}'"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases() {
        assert_eq!(parse("s"), Command::Step);
        assert_eq!(parse("step"), Command::Step);
        assert_eq!(parse("o"), Command::StepOver);
        assert_eq!(parse("u"), Command::StepOut);
        assert_eq!(parse("c"), Command::Resume);
        assert_eq!(parse("go"), Command::Resume);
        assert_eq!(parse("bt"), Command::Backtrace);
        assert_eq!(parse("bp"), Command::Breakpoints);
        assert_eq!(parse("q"), Command::Detach);
        assert_eq!(parse("h"), Command::Help);
    }

    #[test]
    fn blank_line_is_blank() {
        assert_eq!(parse(""), Command::Blank);
        assert_eq!(parse("   "), Command::Blank);
    }

    #[test]
    fn parses_break_location() {
        assert_eq!(
            parse("break main.js:42"),
            Command::Break {
                file: "main.js".into(),
                line: 42
            }
        );
        assert_eq!(
            parse("b main.js:42"),
            Command::Break {
                file: "main.js".into(),
                line: 42
            }
        );
        assert!(matches!(parse("break main.js"), Command::InvalidArgs { .. }));
    }

    #[test]
    fn parses_eval_expression() {
        assert_eq!(parse("p 1+2"), Command::Eval("1+2".into()));
        assert_eq!(parse("eval x.y"), Command::Eval("x.y".into()));
        assert!(matches!(parse("p"), Command::InvalidArgs { .. }));
    }

    #[test]
    fn parses_frame_and_clear_indices() {
        assert_eq!(parse("frame 2"), Command::Frame(2));
        assert_eq!(parse("f 2"), Command::Frame(2));
        assert_eq!(parse("clear 7"), Command::Clear(7));
        assert!(matches!(parse("frame x"), Command::InvalidArgs { .. }));
    }

    #[test]
    fn unknown_command_is_preserved() {
        assert_eq!(parse("frobnicate"), Command::Unknown("frobnicate".into()));
    }
}
