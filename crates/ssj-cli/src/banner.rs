//! Version banner, usage text, and the `--explode` easter egg.

use rand::Rng;

const VERSION_NAME: &str = env!("CARGO_PKG_VERSION");

const CELL_QUOTES: &[&str] = &[
    "I expected the end to be a little more dramatic...",
    "Don't you realize yet you're up against the perfect weapon?!",
    "Would you stop interfering!?",
    "You're all so anxious to die, aren't you? Well all you had to do WAS ASK!",
    "Why can't you people JUST STAY DOWN!!",
    "They just keep lining up to die!",
    "No chance! YOU HAVE NO CHANCE!!",
    "SAY GOODBYE!",
    "I WAS PERFECT...!",
];

fn arch() -> &'static str {
    if std::mem::size_of::<usize>() == 8 {
        "x64"
    } else {
        "x86"
    }
}

/// The one-line version banner, e.g. `SSJ 0.1.0 Sphere Game Debugger x64`.
#[must_use]
pub fn version_line() -> String {
    format!("SSJ {VERSION_NAME} Sphere Game Debugger {}", arch())
}

/// Full banner: the version line plus copyright, as printed by `--version`
/// and at session start.
#[must_use]
pub fn banner(with_copyright: bool) -> Vec<String> {
    let mut lines = vec![version_line()];
    if with_copyright {
        lines.push("A remote source-level JavaScript debugger".to_string());
    }
    lines
}

/// `--help` output.
#[must_use]
pub fn usage() -> Vec<String> {
    let mut lines = banner(true);
    lines.push(String::new());
    lines.push("USAGE:".to_string());
    lines.push("   ssj [options] <game-path>".to_string());
    lines.push("   ssj -c [options]".to_string());
    lines.push(String::new());
    lines.push("OPTIONS:".to_string());
    lines.push("       --version          Prints the SSJ debugger version.".to_string());
    lines.push("       --help             Prints this help text.".to_string());
    lines.push(
        "   -c, --connect          Attempts to attach to a target already running.".to_string(),
    );
    lines.push(
        "                          If the connection attempt fails, SSJ will exit.".to_string(),
    );
    lines
}

/// Print one of Cell's boss-fight quotes, chosen at random.
#[must_use]
pub fn cell_quote() -> String {
    let index = rand::rng().random_range(0..CELL_QUOTES.len());
    format!(
        "Release it--release everything! Remember all the pain he's caused, the people\n\
         he's hurt--now MAKE THAT YOUR POWER!!\n\n\
         \x20   Cell says:\n    \"{}\"",
        CELL_QUOTES[index]
    )
}
