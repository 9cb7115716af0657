//! CLI module for Halp
//!
//! Provides commands:
//! - `token`: show a stored API token, prompting for it if needed
//! - `delete`: remove stored API tokens
//! - `backends`: list usable secret backends
//! - `version`: show and record the running version

use clap::{Parser, Subcommand, ValueEnum};
use halp_core::{
    available_backends, sequencer_for, settings, CredentialStore, HalpContext, Profile,
    ServiceDescriptor, TerminalPrompter,
};
use tracing::debug;

pub mod backends;
pub mod delete;
pub mod token;
pub mod version;

/// Please Halp me! Basic CLI tool to run quick functions.
#[derive(Parser, Debug)]
#[command(name = "halp")]
#[command(about = "Please Halp me! Basic CLI tool to run quick functions.")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a stored API token
    Token {
        /// Which token to show
        service: ServiceArg,
    },
    /// Delete stored API tokens
    Delete {
        /// Which token to delete
        service: DeleteArg,
    },
    /// List the secret backends this host supports
    Backends,
    /// Show version information
    Version,
}

/// A concrete token service
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ServiceArg {
    /// Jira API token
    Jira,
    /// Tempo API token
    Tempo,
}

/// A token service, or all of them
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeleteArg {
    /// Jira API token
    Jira,
    /// Tempo API token
    Tempo,
    /// Every token
    All,
}

impl ServiceArg {
    pub fn descriptor(self) -> ServiceDescriptor {
        match self {
            Self::Jira => ServiceDescriptor::JIRA,
            Self::Tempo => ServiceDescriptor::TEMPO,
        }
    }
}

impl DeleteArg {
    pub fn descriptor(self) -> ServiceDescriptor {
        match self {
            Self::Jira => ServiceDescriptor::JIRA,
            Self::Tempo => ServiceDescriptor::TEMPO,
            Self::All => ServiceDescriptor::ALL,
        }
    }
}

/// Everything a command needs after startup
pub struct Session {
    pub ctx: HalpContext,
    pub profile: Profile,
    pub store: CredentialStore,
    pub prompter: TerminalPrompter,
}

/// Load the profile, open the credential store and run the unlock sequence
pub fn bootstrap() -> anyhow::Result<Session> {
    let ctx = HalpContext::detect()?;
    let backends = available_backends(&ctx.platform);
    debug!(?backends, os = ?ctx.platform.os, "Detected backends");

    let mut prompter = TerminalPrompter;
    let profile = settings::load(ctx.home(), &backends, &mut prompter)?;
    let store = CredentialStore::open(&ctx, &profile, &backends);

    sequencer_for(&ctx).ensure_unlocked(&store, &mut prompter)?;

    Ok(Session {
        ctx,
        profile,
        store,
        prompter,
    })
}

/// Run the CLI command
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Token { service }) => token::run(service),
        Some(Commands::Delete { service }) => delete::run(service),
        Some(Commands::Backends) => backends::run(),
        Some(Commands::Version) => version::run(),
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}
