//! okurimono CLI binary.

use std::process;

use clap::Parser;
use okurimono::cli::{args::*, commands::*};
use tracing_subscriber::EnvFilter;

fn main() {
    // Parse command line arguments using clap
    let args = OkurimonoArgs::parse();

    // RUST_LOG wins over the verbosity flags when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    // Execute the command
    if let Err(e) = execute_command(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
