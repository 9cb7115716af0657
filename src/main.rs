//! Halp - quick helpers for Jira and Tempo
//!
//! CLI entry point.

#![forbid(unsafe_code)]

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

fn main() {
    let cli = cli::Cli::parse();

    let default_filter = if cli.debug {
        "halp=debug,halp_core=debug"
    } else {
        "halp=warn,halp_core=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = cli::run(cli) {
        match e.downcast_ref::<halp_core::Error>() {
            Some(error) => eprintln!("{}", halp_core::format_error_for_cli(error)),
            None => eprintln!("❌ {:#}", e),
        }
        std::process::exit(1);
    }
}
