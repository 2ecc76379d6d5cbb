use crossterm::event::{Event, KeyCode, KeyEventKind};

use crate::sim::Command;

/// Takes an event, checks if it is a key press event, and returns the [`KeyCode`]
pub(super) fn event_keycode(event: &Event) -> Option<KeyCode> {
    let Event::Key(key) = event else {
        return None;
    };

    if key.kind != KeyEventKind::Press {
        return None;
    }

    Some(key.code)
}

/// Keys that drive the simulation rather than the UI
pub(super) fn command_for(key: KeyCode) -> Option<Command> {
    match key {
        KeyCode::Char(' ') => Some(Command::ToggleSpeed),
        KeyCode::Char('v') => Some(Command::ToggleBestPathView),
        KeyCode::Char('r') => Some(Command::ResetEpisode),
        KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEvent, KeyEventState, KeyModifiers};

    use super::*;

    fn key(code: KeyCode, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn only_presses_count() {
        assert_eq!(
            event_keycode(&key(KeyCode::Char('v'), KeyEventKind::Press)),
            Some(KeyCode::Char('v'))
        );
        assert_eq!(
            event_keycode(&key(KeyCode::Char('v'), KeyEventKind::Release)),
            None
        );
        assert_eq!(event_keycode(&Event::FocusGained), None);
    }

    #[test]
    fn command_keys() {
        assert_eq!(command_for(KeyCode::Char(' ')), Some(Command::ToggleSpeed));
        assert_eq!(
            command_for(KeyCode::Char('v')),
            Some(Command::ToggleBestPathView)
        );
        assert_eq!(command_for(KeyCode::Char('r')), Some(Command::ResetEpisode));
        assert_eq!(command_for(KeyCode::Char('q')), Some(Command::Quit));
        assert_eq!(command_for(KeyCode::Tab), None);
    }
}
