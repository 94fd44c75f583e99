use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use teller_core::{Config, TurnState};
use tracing::warn;
use crate::app::{App, FocusPane, InputMode, VerificationPhase};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // Popups take the keyboard first
    if app.verification.is_some() {
        handle_verification(app, key);
        return;
    }
    if app.turn_state() == TurnState::HandoffPending {
        handle_payment_prompt(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_verification(app: &mut App, key: KeyEvent) {
    let Some(verification) = app.verification.as_mut() else {
        return;
    };
    // Buttons are disabled while processing or showing success
    if verification.phase != VerificationPhase::Review {
        return;
    }
    match key.code {
        KeyCode::Enter | KeyCode::Char('c') => verification.start_processing(),
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Backspace => app.close_verification(),
        _ => {}
    }
}

fn handle_payment_prompt(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('y') => app.confirm_payment(),
        KeyCode::Esc | KeyCode::Char('n') => app.cancel_payment(),
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        // Quit
        KeyCode::Char('q') => app.should_quit = true,

        // Back to typing
        KeyCode::Char('i') | KeyCode::Char('/') => {
            app.focus = FocusPane::Input;
            app.input_mode = InputMode::Editing;
        }

        KeyCode::Tab => app.cycle_focus(),

        // Switch language and remember it
        KeyCode::Char('l') => {
            let locale = app.toggle_locale();
            if let Err(e) = Config::save_locale(locale) {
                warn!(error = %e, "could not save interface language");
            }
        }

        KeyCode::Char('j') | KeyCode::Down => {
            if app.focus == FocusPane::Suggestions {
                app.suggestion_nav_down();
            } else {
                app.scroll_down(1);
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if app.focus == FocusPane::Suggestions {
                app.suggestion_nav_up();
            } else {
                app.scroll_up(1);
            }
        }
        KeyCode::Char('g') => {
            app.follow_tail = false;
            app.chat_scroll = 0;
        }
        KeyCode::Char('G') => app.scroll_to_bottom(),

        // Half-page scroll
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_down((app.chat_height / 2).max(1));
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_up((app.chat_height / 2).max(1));
        }

        KeyCode::Enter => {
            if app.focus == FocusPane::Suggestions {
                app.submit_selected_suggestion();
            } else {
                app.focus = FocusPane::Input;
                app.input_mode = InputMode::Editing;
            }
        }

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.focus = FocusPane::Chat;
        }
        KeyCode::Tab => app.cycle_focus(),
        KeyCode::Enter => app.submit_input(),
        KeyCode::Backspace => {
            if app.cursor > 0 {
                app.cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.cursor = (app.cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.cursor = 0;
        }
        KeyCode::End => {
            app.cursor = app.input.chars().count();
        }
        KeyCode::PageUp => app.scroll_up(app.chat_height.max(1)),
        KeyCode::PageDown => app.scroll_down(app.chat_height.max(1)),
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.cursor);
            app.input.insert(byte_pos, c);
            app.cursor += 1;
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app.chat_area.map(|r| point_in_rect(mouse.column, mouse.row, r)).unwrap_or(false);
    let in_suggestions = app
        .suggestions_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if in_chat {
                app.scroll_down(3);
            } else if in_suggestions {
                app.suggestion_nav_down();
            }
        }
        MouseEventKind::ScrollUp => {
            if in_chat {
                app.scroll_up(3);
            } else if in_suggestions {
                app.suggestion_nav_up();
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_to_byte_index_multibyte() {
        let s = "Xin chào";
        assert_eq!(char_to_byte_index(s, 0), 0);
        assert_eq!(char_to_byte_index(s, 6), 6);
        assert_eq!(char_to_byte_index(s, 7), 7 + 1);
        assert_eq!(char_to_byte_index(s, 100), s.len());
    }

    #[test]
    fn test_point_in_rect() {
        let r = Rect::new(2, 2, 4, 3);
        assert!(point_in_rect(2, 2, r));
        assert!(point_in_rect(5, 4, r));
        assert!(!point_in_rect(6, 4, r));
        assert!(!point_in_rect(1, 2, r));
    }
}
