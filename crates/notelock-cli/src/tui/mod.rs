mod app;
mod view;

use std::{io, time::Duration};

use color_eyre::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use notelock_core::{session::Session, store::NoteStore};
use ratatui::{backend::CrosstermBackend, Terminal};

use self::app::{App, NoticeLevel};

/// Run the locker until the user quits. The session starts locked.
pub fn launch<S: NoteStore>(session: Session<S>) -> Result<()> {
    let mut app = App::new(session);
    {
        // Guard restores the terminal even if we early-return.
        let guard = TerminalGuard::enter()?;
        let mut terminal = guard.terminal()?;
        while !app.should_quit() {
            terminal.draw(|frame| view::render(frame, &app))?;

            if event::poll(Duration::from_millis(150))? {
                if let Event::Key(key) = event::read()? {
                    // Windows also reports releases.
                    if key.kind == KeyEventKind::Press {
                        app.handle_key(key);
                    }
                }
            }
        }
    }

    // A failed save on exit must still reach the user after the screen is gone.
    if let Some(notice) = app.notice().filter(|n| n.level == NoticeLevel::Error) {
        eprintln!("notelock: {}", notice.text);
    }
    Ok(())
}

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        // Enter alternate screen to avoid polluting the shell buffer.
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }

    fn terminal(&self) -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
        let backend = CrosstermBackend::new(io::stdout());
        Ok(Terminal::new(backend)?)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Best-effort cleanup; errors are logged but not propagated from Drop.
        if let Err(err) = disable_raw_mode() {
            eprintln!("failed to disable raw mode: {err}");
        }
        if let Err(err) = execute!(io::stdout(), LeaveAlternateScreen) {
            eprintln!("failed to restore terminal: {err}");
        }
    }
}
