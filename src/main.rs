//! Quill - Main entry point.
//!
//! An interactive multi-document editing shell.
//!
//! Usage: quill [OPTIONS] [DIR]
//!
//! Options:
//!   --version, -v    Show version
//!
//! Starts the shell rooted at DIR (default: current directory) and
//! restores the previous session's open files from its snapshot.

use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use quill::app::{App, AppError, Outcome, StdinPrompt};
use quill::logging::{self, LogConfig};

/// Crate version from Cargo.
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--version" || a == "-v") {
        println!("quill v{}", VERSION);
        return Ok(());
    }

    // Diagnostics go to ~/.quill/logs/, never to the REPL
    if let Err(e) = logging::init(&LogConfig::default()) {
        eprintln!("warning: diagnostics logging unavailable: {}", e);
    }

    let root = args
        .iter()
        .skip(1)
        .find(|a| !a.starts_with('-'))
        .map_or_else(
            || env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            PathBuf::from,
        );

    let mut app = App::new(root);
    app.restore_session();

    let stdin = io::stdin();
    let mut prompt = StdinPrompt;
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF behaves like exit
            line = "exit".to_string();
        }

        match app.dispatch(&line, &mut prompt) {
            Ok(Outcome::Done) => {}
            Ok(Outcome::Output(lines)) => {
                for out in lines {
                    println!("{}", out);
                }
            }
            Ok(Outcome::Exit) => break,
            Err(AppError::Usage(msg)) => println!("{}", msg),
            Err(e) => println!("error: {}", e),
        }
    }

    Ok(())
}
