use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use notelock_core::{
    gate::GateError,
    session::{CloseChoice, CloseOutcome, Session},
    store::NoteStore,
};
use ratatui::{
    style::{Color, Style},
    widgets::{Block, BorderType, Borders},
};
use tui_textarea::TextArea;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Last message shown under the content area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// What a masked prompt is asking for. Later steps of the gate-code change
/// carry the answers collected so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    Unlock,
    CurrentCode,
    NewCode { current: String },
    ConfirmCode { current: String, new: String },
}

impl PromptKind {
    fn title(&self) -> &'static str {
        match self {
            PromptKind::Unlock => "Enter gate code to unlock",
            PromptKind::CurrentCode => "Current gate code",
            PromptKind::NewCode { .. } => "New gate code",
            PromptKind::ConfirmCode { .. } => "Repeat new gate code",
        }
    }
}

/// Single-line masked input. Enter answers, Esc cancels.
pub struct Prompt {
    kind: PromptKind,
    input: TextArea<'static>,
}

impl Prompt {
    fn new(kind: PromptKind) -> Self {
        let mut input = TextArea::default();
        input.set_mask_char('•');
        input.set_cursor_line_style(Style::default());
        input.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Cyan))
                .title(kind.title()),
        );
        Self { kind, input }
    }

    pub fn kind(&self) -> &PromptKind {
        &self.kind
    }

    pub fn input(&self) -> &TextArea<'static> {
        &self.input
    }

    fn value(&self) -> String {
        self.input.lines().concat()
    }
}

pub enum Mode {
    Main,
    Prompt(Prompt),
    /// Waiting for y / n / Esc on exit while unlocked.
    ConfirmClose,
}

/// Front-end state around a [`Session`]: the editor buffer, the active modal
/// and the last notice. Key handling is kept free of terminal I/O.
pub struct App<S: NoteStore> {
    session: Session<S>,
    editor: TextArea<'static>,
    mode: Mode,
    notice: Option<Notice>,
    quit: bool,
}

impl<S: NoteStore> App<S> {
    pub fn new(session: Session<S>) -> Self {
        Self {
            session,
            editor: editor_with(""),
            mode: Mode::Main,
            notice: None,
            quit: false,
        }
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    pub fn editor(&self) -> &TextArea<'static> {
        &self.editor
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Current editor contents, lines joined with `\n`.
    pub fn editor_text(&self) -> String {
        self.editor.lines().join("\n")
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.mode {
            Mode::ConfirmClose => self.handle_close_key(key),
            Mode::Prompt(_) => self.handle_prompt_key(key),
            Mode::Main => self.handle_main_key(key),
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        let Mode::Prompt(prompt) = &mut self.mode else {
            return;
        };
        match key.code {
            KeyCode::Enter => {
                let value = prompt.value();
                self.finish_prompt(Some(value));
            }
            KeyCode::Esc => self.finish_prompt(None),
            _ => {
                prompt.input.input(key);
            }
        }
    }

    fn handle_main_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('l') if ctrl => self.toggle_lock(),
            KeyCode::Char('p') if ctrl => self.open_prompt(PromptKind::CurrentCode),
            KeyCode::Char('q') if ctrl => self.request_close(),
            KeyCode::Esc => self.request_close(),
            _ if self.session.is_locked() => match key.code {
                KeyCode::Enter | KeyCode::Char('u') => self.open_prompt(PromptKind::Unlock),
                KeyCode::Char('p') => self.open_prompt(PromptKind::CurrentCode),
                KeyCode::Char('q') => self.request_close(),
                _ => {}
            },
            _ => {
                self.editor.input(key);
            }
        }
    }

    fn handle_close_key(&mut self, key: KeyEvent) {
        let choice = match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(CloseChoice::Save),
            KeyCode::Char('n') | KeyCode::Char('N') => Some(CloseChoice::Discard),
            KeyCode::Char('c') | KeyCode::Esc => None,
            _ => return,
        };
        let edited = self.editor_text();
        match self.session.close(choice, &edited) {
            CloseOutcome::Stay => self.mode = Mode::Main,
            CloseOutcome::Exit => self.quit = true,
            CloseOutcome::ExitWithError(err) => {
                self.error(err);
                self.quit = true;
            }
        }
    }

    fn toggle_lock(&mut self) {
        if self.session.is_locked() {
            self.open_prompt(PromptKind::Unlock);
            return;
        }
        let edited = self.editor_text();
        match self.session.lock(&edited) {
            Ok(()) => {
                self.editor = editor_with("");
                self.info("Locked and saved.");
            }
            Err(err) => self.error(err),
        }
    }

    fn request_close(&mut self) {
        if self.session.is_locked() {
            if self.session.close(None, "") == CloseOutcome::Exit {
                self.quit = true;
            }
        } else {
            self.mode = Mode::ConfirmClose;
        }
    }

    fn open_prompt(&mut self, kind: PromptKind) {
        self.mode = Mode::Prompt(Prompt::new(kind));
    }

    fn finish_prompt(&mut self, value: Option<String>) {
        let Mode::Prompt(prompt) = std::mem::replace(&mut self.mode, Mode::Main) else {
            return;
        };

        if prompt.kind == PromptKind::Unlock {
            let unlocked = self
                .session
                .unlock(value.as_deref())
                .map(|shown| shown.map(editor_with));
            match unlocked {
                Ok(Some(editor)) => {
                    self.editor = editor;
                    self.notice = None;
                }
                Ok(None) => {}
                Err(err) => self.error(err),
            }
            return;
        }

        // Cancelling any step of the change flow abandons it quietly.
        let Some(value) = value else {
            return;
        };
        match prompt.kind {
            PromptKind::Unlock => {}
            PromptKind::CurrentCode => {
                if self.session.matches(&value) {
                    self.open_prompt(PromptKind::NewCode { current: value });
                } else {
                    self.error(GateError::WrongGateCode);
                }
            }
            PromptKind::NewCode { current } => {
                if value.is_empty() {
                    self.error(GateError::EmptyGateCode);
                } else {
                    self.open_prompt(PromptKind::ConfirmCode {
                        current,
                        new: value,
                    });
                }
            }
            PromptKind::ConfirmCode { current, new } => {
                match self.session.change_gate_code(&current, &new, &value) {
                    Ok(()) => self.info("Gate code changed."),
                    Err(err) => self.error(err),
                }
            }
        }
    }

    fn info(&mut self, text: &str) {
        self.notice = Some(Notice {
            level: NoticeLevel::Info,
            text: text.to_string(),
        });
    }

    fn error(&mut self, err: GateError) {
        self.notice = Some(Notice {
            level: NoticeLevel::Error,
            text: err.to_string(),
        });
    }
}

fn editor_with(text: &str) -> TextArea<'static> {
    // split, not lines(): a trailing newline must survive the round trip.
    let mut editor = TextArea::new(text.split('\n').map(str::to_string).collect());
    editor.set_cursor_line_style(Style::default());
    editor.set_block(
        Block::default()
            .borders(Borders::ALL)
            .title("Content (unlocked)"),
    );
    editor
}
