//! propsync CLI: the `propsync` command.

mod cli;
mod commands;
mod support;

use std::process::ExitCode;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Capture { document, out } => commands::capture::run(&document, &out),

        Commands::Reconcile {
            snapshot_dir,
            document,
            out,
            config,
            tolerance,
            strict,
            json,
        } => commands::reconcile::run(commands::reconcile::Args {
            snapshot_dir,
            document,
            out,
            config,
            tolerance,
            strict,
            json,
        }),

        Commands::CheckNames { document } => commands::check_names::run(&document),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}
