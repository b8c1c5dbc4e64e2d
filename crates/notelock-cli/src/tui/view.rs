use notelock_core::store::NoteStore;
use ratatui::{
    layout::{Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::app::{App, Mode, NoticeLevel};

/// Draw the whole screen: header, content, notice line, controls and any modal.
pub fn render<S: NoteStore>(frame: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let locked = app.session().is_locked();

    let (badge, badge_color) = if locked {
        ("locked", Color::Yellow)
    } else {
        ("unlocked", Color::Green)
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "Notelock",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("[{badge}]"),
            Style::default()
                .fg(badge_color)
                .add_modifier(Modifier::BOLD),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    frame.render_widget(header, chunks[0]);

    if locked {
        let body = Paragraph::new(app.session().view())
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Content"));
        frame.render_widget(body, chunks[1]);
    } else {
        frame.render_widget(app.editor(), chunks[1]);
    }

    if let Some(notice) = app.notice() {
        let color = match notice.level {
            NoticeLevel::Info => Color::Green,
            NoticeLevel::Error => Color::Red,
        };
        frame.render_widget(
            Paragraph::new(notice.text.as_str()).style(Style::default().fg(color)),
            chunks[2],
        );
    }

    let footer = Paragraph::new(controls(locked))
        .block(Block::default().borders(Borders::ALL).title("Controls"));
    frame.render_widget(footer, chunks[3]);

    match app.mode() {
        Mode::Main => {}
        Mode::Prompt(prompt) => {
            let area = centered(frame.area(), 44, 3);
            frame.render_widget(Clear, area);
            frame.render_widget(prompt.input(), area);
        }
        Mode::ConfirmClose => {
            let area = centered(frame.area(), 44, 5);
            frame.render_widget(Clear, area);
            let dialog = Paragraph::new(vec![
                Line::from("Save current content?"),
                Line::from(vec![
                    key_span("y"),
                    Span::raw(" save  "),
                    key_span("n"),
                    Span::raw(" discard  "),
                    key_span("Esc"),
                    Span::raw(" cancel"),
                ]),
            ])
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title("Quit"),
            );
            frame.render_widget(dialog, area);
        }
    }
}

fn controls(locked: bool) -> Line<'static> {
    let mut spans = Vec::new();
    if locked {
        spans.extend([key_span("Enter"), Span::raw(" unlock  ")]);
        spans.extend([key_span("p"), Span::raw(" change code  ")]);
        spans.extend([key_span("q"), Span::raw(" quit")]);
    } else {
        spans.extend([key_span("Ctrl-L"), Span::raw(" lock  ")]);
        spans.extend([key_span("Ctrl-P"), Span::raw(" change code  ")]);
        spans.extend([key_span("Esc"), Span::raw(" quit")]);
    }
    Line::from(spans)
}

fn key_span(key: &'static str) -> Span<'static> {
    Span::styled(key, Style::default().fg(Color::Cyan))
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use notelock_core::{gate::LOCKED_PLACEHOLDER, session::Session, store::InMemoryNoteStore};
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;

    fn screen<S: NoteStore>(app: &App<S>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).expect("terminal");
        terminal.draw(|frame| render(frame, app)).expect("draw");
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn press<S: NoteStore>(app: &mut App<S>, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn app() -> App<InMemoryNoteStore> {
        let store = InMemoryNoteStore::new()
            .with_gate_code("2468")
            .with_content("bank pin 9090");
        App::new(Session::open(store))
    }

    #[test]
    fn locked_screen_shows_placeholder_only() {
        let rendered = screen(&app());
        assert!(rendered.contains(LOCKED_PLACEHOLDER));
        assert!(rendered.contains("[locked]"));
        assert!(!rendered.contains("bank pin"));
    }

    #[test]
    fn prompt_input_is_masked() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        for c in "2468".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        let rendered = screen(&app);
        assert!(rendered.contains("Enter gate code to unlock"));
        assert!(!rendered.contains("2468"));
    }

    #[test]
    fn unlocked_screen_shows_content() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        for c in "2468".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);

        let rendered = screen(&app);
        assert!(rendered.contains("bank pin 9090"));
        assert!(rendered.contains("[unlocked]"));
        assert!(!rendered.contains(LOCKED_PLACEHOLDER));
    }
}
