//! `ssj`: a remote source-level JavaScript debugger REPL.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod banner;
mod cli;
mod commands;
mod format;
mod launch;
mod session;

use std::io::{self, BufRead, Write};
use std::net::TcpStream;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use cli::Args;
use ssj_core::{MessageFramer, SsjError};
use tracing_subscriber::EnvFilter;

use crate::session::Session;

const DRAIN_POLL_TIMEOUT: Duration = Duration::from_millis(20);

fn main() -> ExitCode {
    let args = Args::parse();

    if args.help {
        for line in banner::usage() {
            println!("{line}");
        }
        return ExitCode::SUCCESS;
    }
    if args.version {
        for line in banner::banner(true) {
            println!("{line}");
        }
        return ExitCode::SUCCESS;
    }
    if args.explode {
        println!("{}", banner::cell_quote());
        return ExitCode::SUCCESS;
    }
    if !args.connect && args.game_path.is_none() {
        for line in banner::usage() {
            println!("{line}");
        }
        return ExitCode::SUCCESS;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    for line in banner::banner(true) {
        println!("{line}");
    }
    println!();

    if let Some(path) = &args.game_path {
        print!("Starting the engine... ");
        let _ = io::stdout().flush();
        if let Err(err) = launch::spawn_engine(path) {
            println!("failed.");
            eprintln!("ssj: error: failed to start engine: {err}");
            return ExitCode::from(1);
        }
        println!("OK.");
    }

    let stream = match launch::connect_with_retry() {
        Ok(stream) => stream,
        Err(err) => {
            eprintln!("ssj: error: could not connect to target: {err}");
            return ExitCode::from(1);
        }
    };

    match run_session(stream) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ssj: {err}");
            ExitCode::from(1)
        }
    }
}

fn run_session(stream: TcpStream) -> Result<(), SsjError> {
    let timeout_handle = stream.try_clone()?;
    let reader = stream.try_clone()?;
    let writer = stream;

    let framer = MessageFramer::new(reader, writer);
    let mut session = Session::new(framer, false);

    if let Some(line) = session.await_notification()? {
        println!("{line}");
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while !session.is_detached() {
        timeout_handle.set_read_timeout(Some(DRAIN_POLL_TIMEOUT))?;
        for line in session.drain_notifications()? {
            println!("{line}");
        }
        timeout_handle.set_read_timeout(None)?;

        if session.is_detached() {
            break;
        }

        if let Some(file_name) = session.pending_source_fetch() {
            for line in session.fetch_source(&file_name)? {
                println!("{line}");
            }
        }
        for line in session.render_prompt_context() {
            println!("{line}");
        }

        print!("(ssj)> ");
        io::stdout().flush()?;

        let Some(input) = lines.next() else {
            break;
        };
        let input = input?;
        let command = commands::parse(&input);

        match session.dispatch(command) {
            Ok(output) => {
                for line in output {
                    println!("{line}");
                }
            }
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => println!("error: {err}"),
        }
    }

    Ok(())
}
