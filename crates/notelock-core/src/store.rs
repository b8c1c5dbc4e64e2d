use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;

use crate::gate::GateCode;

/// Errors produced by note store implementations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Underlying storage failure.
    #[error("storage failure: {reason}")]
    Storage { reason: String },
}

/// Persistence contract for the two artifacts: the gate code and the protected text.
///
/// Loads never fail: an absent or unreadable artifact yields a fallback value.
/// Saves overwrite the artifact and report failure without panicking.
pub trait NoteStore {
    /// Stored gate code, or the default when missing or unparsable.
    /// A missing settings record is created with the default as a side effect.
    fn load_gate_code(&self) -> GateCode;

    fn save_gate_code(&self, code: &GateCode) -> Result<(), StoreError>;

    /// Stored protected text, or an empty string when missing or unreadable.
    fn load_content(&self) -> String;

    fn save_content(&self, text: &str) -> Result<(), StoreError>;

    /// Confirm that saves could succeed without touching either artifact.
    fn check_writable(&self) -> Result<(), StoreError>;
}

/// In-memory note store for tests and smoke runs. Clones share state, so a
/// test can keep a handle and inspect what a session wrote.
#[derive(Debug, Default, Clone)]
pub struct InMemoryNoteStore {
    inner: Arc<Mutex<Artifacts>>,
}

#[derive(Debug, Default)]
struct Artifacts {
    gate_code: Option<String>,
    content: Option<String>,
    fail_writes: bool,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a settings record already holding `code`.
    pub fn with_gate_code(self, code: impl Into<String>) -> Self {
        self.artifacts().gate_code = Some(code.into());
        self
    }

    /// Start with a content record already holding `text`.
    pub fn with_content(self, text: impl Into<String>) -> Self {
        self.artifacts().content = Some(text.into());
        self
    }

    /// Make every subsequent save fail, leaving stored values untouched.
    pub fn set_fail_writes(&self, fail: bool) {
        self.artifacts().fail_writes = fail;
    }

    /// Raw settings value, `None` if never written.
    pub fn stored_gate_code(&self) -> Option<String> {
        self.artifacts().gate_code.clone()
    }

    /// Raw content value, `None` if never written.
    pub fn stored_content(&self) -> Option<String> {
        self.artifacts().content.clone()
    }

    fn artifacts(&self) -> MutexGuard<'_, Artifacts> {
        // Single-threaded use; a poisoned lock still holds consistent data.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self, apply: impl FnOnce(&mut Artifacts)) -> Result<(), StoreError> {
        let mut artifacts = self.artifacts();
        if artifacts.fail_writes {
            return Err(StoreError::Storage {
                reason: "writes disabled".to_string(),
            });
        }
        apply(&mut artifacts);
        Ok(())
    }
}

impl NoteStore for InMemoryNoteStore {
    fn load_gate_code(&self) -> GateCode {
        if let Some(code) = self.stored_gate_code() {
            return GateCode::new(code);
        }
        let code = GateCode::default();
        if let Err(err) = self.save_gate_code(&code) {
            tracing::warn!("failed to write default gate code: {err}");
        }
        code
    }

    fn save_gate_code(&self, code: &GateCode) -> Result<(), StoreError> {
        self.write(|a| a.gate_code = Some(code.as_str().to_string()))
    }

    fn load_content(&self) -> String {
        self.stored_content().unwrap_or_default()
    }

    fn save_content(&self, text: &str) -> Result<(), StoreError> {
        self.write(|a| a.content = Some(text.to_string()))
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        self.write(|_| {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_load_writes_default_gate_code() {
        let store = InMemoryNoteStore::new();
        assert_eq!(store.stored_gate_code(), None);

        let code = store.load_gate_code();
        assert_eq!(code, GateCode::default());
        assert_eq!(store.stored_gate_code().as_deref(), Some("123456"));
    }

    #[test]
    fn missing_content_loads_empty() {
        let store = InMemoryNoteStore::new();
        assert_eq!(store.load_content(), "");
        assert_eq!(store.stored_content(), None);
    }

    #[test]
    fn failed_writes_keep_previous_values() {
        let store = InMemoryNoteStore::new()
            .with_gate_code("old")
            .with_content("kept");
        store.set_fail_writes(true);

        let err = store
            .save_content("new")
            .expect_err("save should fail while writes are disabled");
        assert!(matches!(err, StoreError::Storage { .. }));
        store
            .save_gate_code(&GateCode::new("new"))
            .expect_err("gate code save should fail too");
        store
            .check_writable()
            .expect_err("writable check should fail too");

        assert_eq!(store.load_content(), "kept");
        assert_eq!(store.load_gate_code(), GateCode::new("old"));
    }

    #[test]
    fn clones_share_state() {
        let store = InMemoryNoteStore::new();
        let handle = store.clone();
        store.save_content("shared").expect("save");
        assert_eq!(handle.stored_content().as_deref(), Some("shared"));
    }
}
