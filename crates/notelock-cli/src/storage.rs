use std::{
    fs::{self, File, OpenOptions},
    path::PathBuf,
};

use crate::config::Config;
use color_eyre::Result;
use dirs::data_dir;
use notelock_storage::file_store::FileNoteStore;
use tracing::debug;

/// Resolve the default data directory for Notelock.
pub fn default_data_dir() -> Result<PathBuf> {
    let base = data_dir().ok_or_else(|| color_eyre::eyre::eyre!("no data dir available"))?;
    Ok(base.join("notelock"))
}

/// Build the file store, honouring a `data_dir` override from config.
pub fn store_from_config(config: &Config) -> Result<FileNoteStore> {
    let root = match &config.data_dir {
        Some(root) => root.clone(),
        None => default_data_dir()?,
    };
    debug!(?root, "using data directory");
    Ok(FileNoteStore::new(root))
}

/// Log file used while the TUI holds the terminal, next to the data files.
pub fn log_path(config: &Config) -> Result<PathBuf> {
    Ok(store_from_config(config)?.root().join("notelock.log"))
}

/// Open the TUI log for appending, creating the data directory if needed.
pub fn open_log_file(config: &Config) -> Result<File> {
    let path = log_path(config)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}
