//! Diagnostic logging setup
//!
//! Logs go to stderr so generated documentation on stdout stays clean.
//! `RUST_LOG` overrides the level chosen from `-v`/`-q`.

use miette::Result;
use tracing_subscriber::EnvFilter;

use crate::cli::GlobalOpts;

/// Level directive for the given verbosity flags
pub fn level(global: &GlobalOpts) -> &'static str {
    if global.quiet {
        return "error";
    }
    match global.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize the global subscriber
pub fn init(global: &GlobalOpts) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level(global)));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(global.verbose > 1)
        .with_ansi(console::Term::stderr().features().colors_supported())
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| miette::miette!("Failed to initialize logging: {}", e))
}
