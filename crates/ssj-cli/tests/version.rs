//! S6 — `ssj --version` prints the banner and exits cleanly.
//!
//! Spawns the real built binary rather than calling `banner::banner`
//! directly, the way `ThomasHabets-rustradio`'s `tests/ax25-decode.rs`
//! drives its CLI end-to-end with `std::process::Command`.

use std::process::Command;

#[test]
fn version_flag_prints_banner_and_exits_success() {
    let exe = env!("CARGO_BIN_EXE_ssj");
    let output = Command::new(exe)
        .arg("--version")
        .output()
        .expect("failed to spawn ssj binary");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("banner is valid utf-8");
    let mut lines = stdout.lines();
    assert!(
        lines
            .next()
            .is_some_and(|first| first.starts_with("SSJ ") && first.contains("Sphere Game Debugger")),
        "unexpected first line: {stdout:?}"
    );
    assert!(stdout.contains("A remote source-level JavaScript debugger"));
}

#[test]
fn help_flag_prints_usage_and_exits_success() {
    let exe = env!("CARGO_BIN_EXE_ssj");
    let output = Command::new(exe)
        .arg("--help")
        .output()
        .expect("failed to spawn ssj binary");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("usage text is valid utf-8");
    assert!(stdout.contains("ssj"), "usage text missing: {stdout:?}");
}
