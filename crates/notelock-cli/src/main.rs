mod cli;
mod config;
mod storage;
mod tui;

use std::{fs, io, sync::Mutex};

use crate::cli::ConfigCommand;
use clap::Parser;
use color_eyre::Result;
use notelock_core::{session::Session, store::NoteStore};
use notelock_storage::file_store::FileNoteStore;
use tracing_subscriber::{
    fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Entry point wiring the CLI to the TUI.
fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = cli::Cli::parse();
    let config = config::load()?;
    let command = cli.command.unwrap_or(cli::Command::Tui);
    init_tracing(&command, &config);

    match command {
        cli::Command::Tui => {
            let session = Session::open(storage::store_from_config(&config)?);
            tui::launch(session)?
        }
        cli::Command::Version => print_version(),
        cli::Command::Health => run_health_check(&config)?,
        cli::Command::Config(ConfigCommand::Init) => init_config(&config)?,
    }

    Ok(())
}

fn init_tracing(command: &cli::Command, config: &config::Config) {
    // Quiet by default; RUST_LOG raises it.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let (writer, ansi) = log_writer(command, config);
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// The TUI draws on the same terminal as stderr, so its logs go to a file.
fn log_writer(command: &cli::Command, config: &config::Config) -> (BoxMakeWriter, bool) {
    if *command != cli::Command::Tui {
        return (BoxMakeWriter::new(io::stderr), true);
    }
    match storage::open_log_file(config) {
        Ok(file) => (BoxMakeWriter::new(Mutex::new(file)), false),
        Err(_) => (BoxMakeWriter::new(io::sink), false),
    }
}

fn print_version() {
    println!("notelock {}", env!("CARGO_PKG_VERSION"));
}

#[derive(Debug, PartialEq, Eq)]
struct HealthReport {
    content_bytes: usize,
}

/// Loads both artifacts and checks the data directory accepts writes.
fn run_health_check(config: &config::Config) -> Result<()> {
    let store = storage::store_from_config(config)?;
    let report = run_store_health(&store)?;
    println!("Data directory: {}", store.root().display());
    println!("Content: {} bytes", report.content_bytes);
    if content_unreadable(&store, &report) {
        println!("Content: file is not valid UTF-8 text and loads as empty");
    }
    println!("Storage: ok");
    Ok(())
}

fn run_store_health<S: NoteStore>(store: &S) -> Result<HealthReport> {
    // Creates a missing settings record; an existing one is never rewritten.
    store.load_gate_code();
    store
        .check_writable()
        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;
    Ok(HealthReport {
        content_bytes: store.load_content().len(),
    })
}

/// A non-empty content file that loaded as nothing hit the read fallback.
fn content_unreadable(store: &FileNoteStore, report: &HealthReport) -> bool {
    report.content_bytes == 0
        && fs::metadata(store.content_path()).is_ok_and(|meta| meta.len() > 0)
}

fn init_config(config: &config::Config) -> Result<()> {
    let path = config::write_default_if_missing(config)?;
    println!("Config initialized at {}", path.display());
    Ok(())
}
