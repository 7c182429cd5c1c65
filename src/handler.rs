use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, FocusPane, InputMode};
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
        AppEvent::Key(key) => handle_key(app, key)?,
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick();
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) -> Result<()> {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return Ok(());
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }

    Ok(())
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        // Quit
        KeyCode::Char('q') => app.should_quit = true,

        // Dismiss the active notification
        KeyCode::Esc => {
            app.active_toast = None;
        }

        // Tab cycles: Presets -> Input -> Conversation -> Presets
        KeyCode::Tab => {
            app.focus = match app.focus {
                FocusPane::Presets => FocusPane::Input,
                FocusPane::Input => FocusPane::Conversation,
                FocusPane::Conversation => FocusPane::Presets,
            };

            // Auto-enter editing mode when focusing input
            if app.focus == FocusPane::Input {
                app.input_mode = InputMode::Editing;
                // Cursor at end of existing text
                app.input_cursor = app.input.chars().count();
            }
        }

        // Jump straight into the input box
        KeyCode::Char('i') => {
            app.focus = FocusPane::Input;
            app.input_mode = InputMode::Editing;
            app.input_cursor = app.input.chars().count();
        }

        // Jump to the preset list
        KeyCode::Char('p') => {
            app.focus = FocusPane::Presets;
        }

        // Navigation per focused pane
        KeyCode::Char('j') | KeyCode::Down => match app.focus {
            FocusPane::Presets => app.preset_nav_down(),
            FocusPane::Conversation => app.scroll_chat_down(),
            FocusPane::Input => {}
        },
        KeyCode::Char('k') | KeyCode::Up => match app.focus {
            FocusPane::Presets => app.preset_nav_up(),
            FocusPane::Conversation => app.scroll_chat_up(),
            FocusPane::Input => {}
        },

        KeyCode::Char('g') => {
            if app.focus == FocusPane::Conversation {
                app.chat_scroll = 0;
            }
        }
        KeyCode::Char('G') => {
            if app.focus == FocusPane::Conversation {
                app.scroll_chat_to_bottom();
            }
        }

        // Enter applies the highlighted preset, or starts editing the input
        KeyCode::Enter => match app.focus {
            FocusPane::Presets => {
                app.select_highlighted_preset();
                app.focus = FocusPane::Input;
                app.input_mode = InputMode::Editing;
                app.input_cursor = app.input.chars().count();
            }
            FocusPane::Input => {
                app.input_mode = InputMode::Editing;
                app.input_cursor = app.input.chars().count();
            }
            FocusPane::Conversation => {}
        },

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            submit(app);
        }
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.input_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.input.chars().count();
        }
        KeyCode::Tab => {
            // Leave the input box without submitting
            app.input_mode = InputMode::Normal;
            app.focus = FocusPane::Conversation;
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
            app.input.insert(byte_pos, c);
            app.input_cursor += 1;
        }
        _ => {}
    }
}

/// Validate the submission and, if accepted, spawn the guidance request in
/// the background. The main loop lands the result.
fn submit(app: &mut App) {
    if let Some(conversation) = app.begin_submit() {
        let backend = app.backend.clone();
        tracing::debug!(
            backend = backend.describe(),
            messages = conversation.len(),
            "submitting guidance request"
        );
        app.guidance_task = Some(tokio::spawn(async move {
            backend.guide(&conversation).await
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guidance::Backend;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn editing_app() -> App {
        let mut app = App::new(Backend::from_endpoint(None));
        app.input_mode = InputMode::Editing;
        app
    }

    #[test]
    fn test_char_to_byte_index_handles_multibyte() {
        let s = "héllo";
        assert_eq!(char_to_byte_index(s, 0), 0);
        assert_eq!(char_to_byte_index(s, 2), 3); // é is two bytes
        assert_eq!(char_to_byte_index(s, 99), s.len());
    }

    #[test]
    fn test_typing_inserts_at_cursor() {
        let mut app = editing_app();
        for c in "abc".chars() {
            handle_key(&mut app, key(KeyCode::Char(c))).unwrap();
        }
        handle_key(&mut app, key(KeyCode::Left)).unwrap();
        handle_key(&mut app, key(KeyCode::Char('x'))).unwrap();
        assert_eq!(app.input, "abxc");
        assert_eq!(app.input_cursor, 3);
    }

    #[test]
    fn test_backspace_removes_before_cursor() {
        let mut app = editing_app();
        app.input = "héllo".to_string();
        app.input_cursor = 2;
        handle_key(&mut app, key(KeyCode::Backspace)).unwrap();
        assert_eq!(app.input, "hllo");
        assert_eq!(app.input_cursor, 1);
    }

    #[tokio::test]
    async fn test_enter_in_editing_mode_spawns_guidance_task() {
        let mut app = editing_app();
        app.input = "chest pain".to_string();
        handle_key(&mut app, key(KeyCode::Enter)).unwrap();
        assert!(app.is_loading);
        assert!(app.guidance_task.is_some());
        app.guidance_task.take().unwrap().abort();
    }

    #[tokio::test]
    async fn test_enter_with_blank_input_spawns_nothing() {
        let mut app = editing_app();
        handle_key(&mut app, key(KeyCode::Enter)).unwrap();
        assert!(!app.is_loading);
        assert!(app.guidance_task.is_none());
        assert!(app.active_toast.is_some());
    }

    #[test]
    fn test_enter_on_preset_applies_it_and_focuses_input() {
        let mut app = App::new(Backend::from_endpoint(None));
        app.focus = FocusPane::Presets;
        app.preset_state.select(Some(0));
        handle_key(&mut app, key(KeyCode::Enter)).unwrap();
        assert!(app.selected_preset.is_some());
        assert_eq!(app.focus, FocusPane::Input);
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[test]
    fn test_tab_cycles_focus() {
        let mut app = App::new(Backend::from_endpoint(None));
        app.focus = FocusPane::Presets;
        app.input_mode = InputMode::Normal;
        handle_key(&mut app, key(KeyCode::Tab)).unwrap();
        assert_eq!(app.focus, FocusPane::Input);
        assert_eq!(app.input_mode, InputMode::Editing);
        // Tab out of the input box drops back to normal mode
        handle_key(&mut app, key(KeyCode::Tab)).unwrap();
        assert_eq!(app.focus, FocusPane::Conversation);
        handle_key(&mut app, key(KeyCode::Tab)).unwrap();
        assert_eq!(app.focus, FocusPane::Presets);
    }

    #[test]
    fn test_esc_dismisses_toast() {
        let mut app = App::new(Backend::from_endpoint(None));
        app.input_mode = InputMode::Normal;
        app.raise_toast(crate::toast::Toast::normal("hi"));
        handle_key(&mut app, key(KeyCode::Esc)).unwrap();
        assert!(app.active_toast.is_none());
    }
}
