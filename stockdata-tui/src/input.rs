//! Keyboard input dispatch — global keys first, then the focused field.
//!
//! Editing and focus changes are applied directly to `AppState`. Login and
//! download need the session and the terminal, so they come back as an
//! `Action` for the event loop to run.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{AppState, Field};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Login,
    Download,
}

pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Action {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // 1. Global keys.
    match key.code {
        KeyCode::Esc => {
            app.running = false;
            return Action::None;
        }
        KeyCode::Char('c') if ctrl => {
            app.running = false;
            return Action::None;
        }
        KeyCode::Char('l') if ctrl => return Action::Login,
        KeyCode::Char('d') if ctrl => return Action::Download,
        KeyCode::Tab => {
            app.focus = if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.focus.prev()
            } else {
                app.focus.next()
            };
            return Action::None;
        }
        KeyCode::BackTab => {
            app.focus = app.focus.prev();
            return Action::None;
        }
        _ => {}
    }

    // 2. Focused field.
    match app.focus {
        Field::Exchange => match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => {
                app.exchange = app.exchange.toggle();
                Action::None
            }
            KeyCode::Enter | KeyCode::Down => {
                app.focus = app.focus.next();
                Action::None
            }
            KeyCode::Up => {
                app.focus = app.focus.prev();
                Action::None
            }
            _ => Action::None,
        },
        Field::Login => match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => Action::Login,
            _ => Action::None,
        },
        Field::Download => match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => Action::Download,
            _ => Action::None,
        },
        Field::Username | Field::Password | Field::Symbols => {
            handle_text_key(app, key);
            Action::None
        }
    }
}

fn handle_text_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Down => app.focus = app.focus.next(),
        KeyCode::Up => app.focus = app.focus.prev(),
        KeyCode::Backspace => {
            if let Some(text) = app.focused_text_mut() {
                text.pop();
            }
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(text) = app.focused_text_mut() {
                text.push(c);
            }
        }
        _ => {}
    }
}
