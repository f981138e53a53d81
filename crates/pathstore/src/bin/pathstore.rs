//! `pathstore`: replay a store script and print the resulting state.
//!
//! Usage:
//!   pathstore < script.json
//!
//! The script is read from stdin; see [`pathstore::cli`] for its shape. The
//! report (final state, per-operation notifications, timing averages) is
//! written to stdout. Log output goes to stderr and is filtered by `RUST_LOG`,
//! defaulting to `pathstore=debug`.

use pathstore::cli::run_script;
use std::io::{self, Read, Write};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pathstore=debug"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();
}

fn main() {
    init_tracing();

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match run_script(buf.trim()) {
        Ok(report) => {
            let mut stdout = io::stdout();
            if let Err(e) = writeln!(stdout, "{report}") {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
