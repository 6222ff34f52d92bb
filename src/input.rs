//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions.  App-wide shortcuts live in
//! [`handle_key_event`]; everything else goes to the focused screen.  While a
//! text-entry screen (publish form, chat) has focus, printable keys are text,
//! so only Ctrl+C is global.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::App;

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit = true;
        return;
    }
    if app.captures_text() {
        app.handle_key(key);
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Tab => app.next_tab(),
        KeyCode::BackTab => app.previous_tab(),
        KeyCode::Char(c @ '1'..='5') => app.tap_slot(c as usize - '1' as usize),
        KeyCode::Char('+') | KeyCode::Char('p') => app.open_publish(),
        _ => app.handle_key(key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use crossterm::event::KeyEventState;

    use crate::config::Config;
    use crate::tabs::Tab;

    fn app(runtime: &tokio::runtime::Runtime) -> App {
        let config = Config::try_parse_from(["pagefeed", "--latency-ms", "0"]).unwrap();
        App::new(&config, runtime.handle().clone())
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn q_quits() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut app = app(&runtime);
        handle_key_event(&mut app, press(KeyCode::Char('q')));
        assert!(app.quit);
    }

    #[test]
    fn release_events_are_ignored() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut app = app(&runtime);
        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        handle_key_event(&mut app, release);
        assert!(!app.quit);
    }

    #[test]
    fn number_keys_tap_slots() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut app = app(&runtime);
        handle_key_event(&mut app, press(KeyCode::Char('5')));
        assert_eq!(app.tabs().selected(), Tab::Profile);
        handle_key_event(&mut app, press(KeyCode::Tab));
        assert_eq!(app.tabs().selected(), Tab::Home);
        handle_key_event(&mut app, press(KeyCode::BackTab));
        assert_eq!(app.tabs().selected(), Tab::Profile);
    }

    #[test]
    fn text_entry_swallows_shortcuts() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut app = app(&runtime);
        handle_key_event(&mut app, press(KeyCode::Char('3')));
        assert!(app.captures_text(), "slot 3 is the publish button");

        handle_key_event(&mut app, press(KeyCode::Char('q')));
        assert!(!app.quit, "q is typed into the form");

        handle_key_event(&mut app, press(KeyCode::Esc));
        assert!(!app.captures_text(), "Esc closes the form");
        assert_eq!(app.tabs().selected(), Tab::Home);

        handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.quit);
    }
}
