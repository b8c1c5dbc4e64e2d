//! Concrete storage for Notelock: a settings record and a raw content file
//! kept side by side in one data directory.

pub mod file_store;
