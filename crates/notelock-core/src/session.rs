use tracing::{debug, info, instrument, warn};

use crate::{
    gate::{GateCode, GateError, LockState, LOCKED_PLACEHOLDER},
    store::NoteStore,
};

/// Answer to the "save current content?" question asked on close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseChoice {
    Save,
    Discard,
}

/// What the front end should do after a close request.
#[derive(Debug, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The user cancelled; keep running.
    Stay,
    Exit,
    /// Exit anyway, but tell the user the final save failed.
    ExitWithError(GateError),
}

/// Application state for one run: the store, the live gate code, the
/// in-memory protected text and the lock flag.
///
/// Every session starts locked. On-disk content is only written by
/// [`Session::lock`], [`Session::save`] and [`Session::close`].
pub struct Session<S: NoteStore> {
    store: S,
    gate_code: GateCode,
    content: String,
    state: LockState,
}

impl<S: NoteStore> Session<S> {
    /// Load both artifacts and start locked.
    pub fn open(store: S) -> Self {
        let gate_code = store.load_gate_code();
        let content = store.load_content();
        debug!(bytes = content.len(), "session opened");
        Self {
            store,
            gate_code,
            content,
            state: LockState::Locked,
        }
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state == LockState::Locked
    }

    /// Text for the main display area.
    pub fn view(&self) -> &str {
        match self.state {
            LockState::Locked => LOCKED_PLACEHOLDER,
            LockState::Unlocked => &self.content,
        }
    }

    /// Check a candidate without changing state.
    pub fn matches(&self, candidate: &str) -> bool {
        self.gate_code.matches(candidate)
    }

    /// Unlock with a prompted candidate; `None` means the prompt was cancelled.
    ///
    /// On success the protected text is reloaded from storage and returned.
    #[instrument(skip_all)]
    pub fn unlock(&mut self, candidate: Option<&str>) -> Result<Option<&str>, GateError> {
        let Some(candidate) = candidate else {
            return Ok(None);
        };
        if !self.is_locked() {
            return Err(GateError::AlreadyUnlocked);
        }
        if !self.gate_code.matches(candidate) {
            info!("unlock rejected");
            return Err(GateError::WrongGateCode);
        }
        self.content = self.store.load_content();
        self.state = LockState::Unlocked;
        info!("unlocked");
        Ok(Some(&self.content))
    }

    /// Capture `edited` as the protected text, persist it and lock.
    /// A failed write leaves the session unlocked.
    #[instrument(skip_all)]
    pub fn lock(&mut self, edited: &str) -> Result<(), GateError> {
        if self.is_locked() {
            return Err(GateError::AlreadyLocked);
        }
        self.store.save_content(edited)?;
        self.content = edited.to_string();
        self.state = LockState::Locked;
        info!("locked");
        Ok(())
    }

    /// Persist the protected text. While unlocked `edited` is taken as the new
    /// text; while locked it is ignored and the in-memory text is written.
    #[instrument(skip_all, fields(state = ?self.state))]
    pub fn save(&mut self, edited: &str) -> Result<(), GateError> {
        if !self.is_locked() {
            self.content = edited.to_string();
        }
        self.store.save_content(&self.content)?;
        debug!(bytes = self.content.len(), "content saved");
        Ok(())
    }

    /// Replace the gate code. The live code only changes after the new value
    /// has been written.
    #[instrument(skip_all)]
    pub fn change_gate_code(
        &mut self,
        current: &str,
        new: &str,
        confirm: &str,
    ) -> Result<(), GateError> {
        if !self.gate_code.matches(current) {
            return Err(GateError::WrongGateCode);
        }
        if new.is_empty() {
            return Err(GateError::EmptyGateCode);
        }
        if new != confirm {
            return Err(GateError::ConfirmationMismatch);
        }
        let next = GateCode::new(new);
        self.store.save_gate_code(&next)?;
        self.gate_code = next;
        info!("gate code changed");
        Ok(())
    }

    /// Handle a close request. Locked sessions exit without asking; unlocked
    /// ones need the answer to the save question, `None` when cancelled.
    pub fn close(&mut self, choice: Option<CloseChoice>, edited: &str) -> CloseOutcome {
        if self.is_locked() {
            return CloseOutcome::Exit;
        }
        match choice {
            None => CloseOutcome::Stay,
            Some(CloseChoice::Discard) => CloseOutcome::Exit,
            Some(CloseChoice::Save) => match self.save(edited) {
                Ok(()) => CloseOutcome::Exit,
                Err(err) => {
                    warn!("final save failed: {err}");
                    CloseOutcome::ExitWithError(err)
                }
            },
        }
    }
}
