use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use notelock_core::{
    gate::{GateCode, DEFAULT_GATE_CODE},
    store::{NoteStore, StoreError},
};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, instrument, warn};

/// File holding the settings record (JSON).
pub const SETTINGS_FILE: &str = "settings.json";
/// File holding the protected text, verbatim.
pub const CONTENT_FILE: &str = "password_content.dat";

/// Plain-text file store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct FileNoteStore {
    root: PathBuf,
}

impl FileNoteStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    pub fn content_path(&self) -> PathBuf {
        self.root.join(CONTENT_FILE)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SettingsRecord {
    #[serde(rename = "master_password", default = "default_gate_code")]
    gate_code: String,
}

fn default_gate_code() -> String {
    DEFAULT_GATE_CODE.to_string()
}

impl NoteStore for FileNoteStore {
    #[instrument(skip_all, fields(root = %self.root.display()))]
    fn load_gate_code(&self) -> GateCode {
        let path = self.settings_path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no settings record, writing default");
                let code = GateCode::default();
                if let Err(err) = self.save_gate_code(&code) {
                    warn!("failed to write default settings: {err}");
                }
                return code;
            }
            Err(err) => {
                warn!("settings unreadable, using default: {err}");
                return GateCode::default();
            }
        };

        match serde_json::from_slice::<SettingsRecord>(&bytes) {
            Ok(record) => GateCode::new(record.gate_code),
            Err(err) => {
                // Left on disk untouched; only a missing record is rewritten.
                warn!("settings unparsable, using default: {err}");
                GateCode::default()
            }
        }
    }

    #[instrument(skip_all, fields(root = %self.root.display()))]
    fn save_gate_code(&self, code: &GateCode) -> Result<(), StoreError> {
        let record = SettingsRecord {
            gate_code: code.as_str().to_string(),
        };
        let json = serde_json::to_vec(&record).map_err(storage_err)?;
        write_file(&self.settings_path(), &json)
    }

    #[instrument(skip_all, fields(root = %self.root.display()))]
    fn load_content(&self) -> String {
        match fs::read_to_string(self.content_path()) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => String::new(),
            Err(err) => {
                warn!("content unreadable, starting empty: {err}");
                String::new()
            }
        }
    }

    #[instrument(skip_all, fields(root = %self.root.display(), bytes = text.len()))]
    fn save_content(&self, text: &str) -> Result<(), StoreError> {
        write_file(&self.content_path(), text.as_bytes())
    }

    #[instrument(skip_all, fields(root = %self.root.display()))]
    fn check_writable(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).map_err(storage_err)?;
        // Removed on drop; neither artifact is opened.
        NamedTempFile::new_in(&self.root).map_err(storage_err)?;
        Ok(())
    }
}

/// Write through a temp file in the same directory so a failed write keeps
/// the previous file.
fn write_file(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let parent = path.parent().ok_or_else(|| StoreError::Storage {
        reason: "invalid storage path".to_string(),
    })?;
    fs::create_dir_all(parent).map_err(storage_err)?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(storage_err)?;
    tmp.write_all(bytes).map_err(storage_err)?;
    tmp.flush().map_err(storage_err)?;
    tmp.persist(path).map_err(|e| storage_err(e.error))?;
    Ok(())
}

fn storage_err<E: ToString>(err: E) -> StoreError {
    StoreError::Storage {
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use notelock_core::session::Session;

    use super::*;

    #[test]
    fn first_run_creates_settings_with_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileNoteStore::new(dir.path().join("notelock"));

        let code = store.load_gate_code();
        assert_eq!(code.as_str(), "123456");

        let written = fs::read_to_string(store.settings_path()).expect("settings written");
        let value: serde_json::Value = serde_json::from_str(&written).expect("json");
        assert_eq!(value["master_password"], "123456");
    }

    #[test]
    fn reads_settings_written_by_earlier_versions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileNoteStore::new(dir.path());
        fs::write(store.settings_path(), r#"{"master_password": "0420"}"#).expect("seed");

        assert!(store.load_gate_code().matches("0420"));
    }

    #[test]
    fn missing_field_falls_back_to_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileNoteStore::new(dir.path());
        fs::write(store.settings_path(), r#"{"theme": "dark"}"#).expect("seed");

        assert_eq!(store.load_gate_code(), GateCode::default());
    }

    #[test]
    fn unparsable_settings_fall_back_and_stay_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileNoteStore::new(dir.path());
        for garbage in ["not json", "[]", r#"{"master_password": 42}"#] {
            fs::write(store.settings_path(), garbage).expect("seed");
            assert_eq!(store.load_gate_code(), GateCode::default());
            assert_eq!(
                fs::read_to_string(store.settings_path()).expect("read"),
                garbage
            );
        }
    }

    #[test]
    fn gate_code_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileNoteStore::new(dir.path());
        store
            .save_gate_code(&GateCode::new("pässwørd"))
            .expect("save");
        assert!(FileNoteStore::new(dir.path())
            .load_gate_code()
            .matches("pässwørd"));
    }

    #[test]
    fn missing_content_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileNoteStore::new(dir.path());
        assert_eq!(store.load_content(), "");
        assert!(!store.content_path().exists());
    }

    #[test]
    fn non_utf8_content_is_treated_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileNoteStore::new(dir.path());
        fs::write(store.content_path(), [0xff, 0xfe, 0x00, 0x80]).expect("seed");
        assert_eq!(store.load_content(), "");
    }

    #[test]
    fn content_is_written_verbatim() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileNoteStore::new(dir.path().join("nested").join("dir"));
        let text = "mail: hunter2\r\nbank: 1234\n\ttabbed ✓\n";

        store.save_content(text).expect("save");
        assert_eq!(fs::read(store.content_path()).expect("read"), text.as_bytes());
        assert_eq!(store.load_content(), text);
    }

    #[test]
    fn save_fails_when_root_is_a_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "i am a file").expect("seed");
        let store = FileNoteStore::new(&blocker);

        let err = store.save_content("text").expect_err("save should fail");
        assert!(matches!(err, StoreError::Storage { .. }));
        store
            .save_gate_code(&GateCode::default())
            .expect_err("settings save should fail too");
        store
            .check_writable()
            .expect_err("writable check should fail too");
        // Loading still falls back rather than failing.
        assert_eq!(store.load_gate_code(), GateCode::default());
        assert_eq!(store.load_content(), "");
    }

    #[test]
    fn writable_check_leaves_directory_as_it_was() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileNoteStore::new(dir.path().join("fresh"));

        store.check_writable().expect("writable");
        let entries: Vec<_> = fs::read_dir(store.root())
            .expect("root created")
            .collect();
        assert!(entries.is_empty());
    }

    #[test]
    fn session_survives_restart_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");

        let mut session = Session::open(FileNoteStore::new(dir.path()));
        session.unlock(Some("123456")).expect("unlock");
        session
            .change_gate_code("123456", "7777", "7777")
            .expect("change");
        session.lock("line one\nline two\n").expect("lock");
        drop(session);

        let mut reopened = Session::open(FileNoteStore::new(dir.path()));
        assert!(reopened.is_locked());
        assert!(reopened.unlock(Some("123456")).is_err());
        assert_eq!(
            reopened.unlock(Some("7777")).expect("unlock"),
            Some("line one\nline two\n")
        );
    }
}
