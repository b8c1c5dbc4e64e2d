use clap::{Parser, Subcommand};

/// CLI surface definition. Running without a subcommand opens the locker.
#[derive(Parser, Debug)]
#[command(
    name = "notelock",
    about = "A gated plain-text note locker for the terminal",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Optional subcommand; defaults to launching the TUI when absent.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open the locker (Ctrl-L lock/unlock, Ctrl-P change gate code, Ctrl-Q quit).
    Tui,
    /// Print version and exit.
    Version,
    /// Load the settings and content files and check the data directory accepts writes.
    Health,
    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Create a default config file if one does not exist.
    Init,
}
