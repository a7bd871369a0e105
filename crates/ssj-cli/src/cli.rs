//! Command-line argument surface.

use std::path::PathBuf;

use clap::Parser;

/// SSJ: a remote source-level JavaScript debugger.
#[derive(Parser, Debug)]
#[command(
    name = "ssj",
    disable_version_flag = true,
    disable_help_flag = true,
    about = None,
    long_about = None
)]
pub struct Args {
    /// Attach to an already-running target; fail if not reachable.
    #[arg(short = 'c', long = "connect")]
    pub connect: bool,

    /// Print the SSJ debugger version and exit.
    #[arg(long)]
    pub version: bool,

    /// Print usage and exit.
    #[arg(long)]
    pub help: bool,

    /// Print an easter-egg quote and exit.
    #[arg(long)]
    pub explode: bool,

    /// Path to the game to launch and attach to.
    pub game_path: Option<PathBuf>,
}
