use std::fmt;

use thiserror::Error;

use crate::store::StoreError;

/// Gate code written on first run when no settings record exists.
pub const DEFAULT_GATE_CODE: &str = "123456";

/// Text shown in place of the protected content while locked.
pub const LOCKED_PLACEHOLDER: &str = "Content is locked. Enter the gate code to unlock.";

/// The shared passphrase gating the protected text. Stored as plain text.
#[derive(Clone, PartialEq, Eq)]
pub struct GateCode(String);

impl GateCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Exact string comparison, no normalisation.
    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for GateCode {
    fn default() -> Self {
        Self::new(DEFAULT_GATE_CODE)
    }
}

// Never print the code itself; logs carry `?gate_code` in a few places.
impl fmt::Debug for GateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GateCode(***)")
    }
}

/// Whether the protected text is visible and editable. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LockState {
    #[default]
    Locked,
    Unlocked,
}

/// User-facing failures of gate operations. Display strings are shown as-is.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("incorrect gate code")]
    WrongGateCode,
    #[error("the new gate code must not be empty")]
    EmptyGateCode,
    #[error("the new gate code and its confirmation do not match")]
    ConfirmationMismatch,
    #[error("content is already locked")]
    AlreadyLocked,
    #[error("content is already unlocked")]
    AlreadyUnlocked,
    #[error("failed to save: {0}")]
    Persist(#[from] StoreError),
}
