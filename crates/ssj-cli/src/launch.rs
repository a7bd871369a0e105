//! Spawns the game engine as a child process and connects to its debug
//! port.

use std::io;
use std::net::TcpStream;
use std::path::Path;
use std::process::{Command as ProcessCommand, Stdio};
use std::time::{Duration, Instant};

use tracing::{info, warn};

const TARGET_ADDR: &str = "127.0.0.1:1208";
const CONNECT_RETRY_WINDOW: Duration = Duration::from_secs(2);
const CONNECT_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Launch the engine against `game_path` with its debug flag set,
/// suppressing its stdout so it doesn't fight the REPL for the terminal.
///
/// # Errors
/// Returns the underlying [`io::Error`] if the child process fails to spawn.
pub fn spawn_engine(game_path: &Path) -> io::Result<()> {
    info!(path = %game_path.display(), "starting engine");
    ProcessCommand::new("msphere")
        .arg("--debug")
        .arg(game_path)
        .stdout(Stdio::null())
        .spawn()?;
    Ok(())
}

/// Connect to the target's debug port, retrying within a bounded window.
///
/// # Errors
/// Returns the last connection error if the window elapses without success.
pub fn connect_with_retry() -> io::Result<TcpStream> {
    let deadline = Instant::now() + CONNECT_RETRY_WINDOW;
    let mut last_err = None;
    loop {
        match TcpStream::connect(TARGET_ADDR) {
            Ok(stream) => return Ok(stream),
            Err(err) => {
                if Instant::now() >= deadline {
                    warn!(%err, "giving up connecting to target");
                    return Err(last_err.unwrap_or(err));
                }
                last_err = Some(err);
                std::thread::sleep(CONNECT_RETRY_INTERVAL);
            }
        }
    }
}
