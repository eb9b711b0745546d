use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::layout::LayoutCommand;

/// Presses and auto-repeats drive commands; releases never do.
pub fn is_press(key: &KeyEvent) -> bool {
    matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat)
}

/// Shared key bindings layouts opt into from `handle_key_input`.
pub fn default_key_command(key: &KeyEvent) -> LayoutCommand {
    if !is_press(key) {
        return LayoutCommand::Invalid;
    }

    match key.code {
        KeyCode::Right => LayoutCommand::PrimaryNext,
        KeyCode::Left => LayoutCommand::PrimaryPrev,
        KeyCode::Up => LayoutCommand::SecondaryNext,
        KeyCode::Down => LayoutCommand::SecondaryPrev,
        KeyCode::Char(' ') => LayoutCommand::Toggle,
        KeyCode::Tab => LayoutCommand::ActiveFrameNext,
        KeyCode::BackTab => LayoutCommand::ActiveFramePrev,
        _ => LayoutCommand::Invalid,
    }
}

/// Zero-based index for keys `1`..`9`.
pub fn digit_key(key: &KeyEvent) -> Option<usize> {
    if !is_press(key) {
        return None;
    }
    match key.code {
        KeyCode::Char(ch @ '1'..='9') => ch.to_digit(10).map(|d| d as usize - 1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers};

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn arrows_map_to_ring_navigation() {
        assert_eq!(
            default_key_command(&key(KeyCode::Right, KeyEventKind::Press)),
            LayoutCommand::PrimaryNext
        );
        assert_eq!(
            default_key_command(&key(KeyCode::Down, KeyEventKind::Repeat)),
            LayoutCommand::SecondaryPrev
        );
    }

    #[test]
    fn releases_are_ignored() {
        assert_eq!(
            default_key_command(&key(KeyCode::Char(' '), KeyEventKind::Release)),
            LayoutCommand::Invalid
        );
        assert_eq!(digit_key(&key(KeyCode::Char('3'), KeyEventKind::Release)), None);
    }

    #[test]
    fn digits_are_zero_based() {
        assert_eq!(digit_key(&key(KeyCode::Char('1'), KeyEventKind::Press)), Some(0));
        assert_eq!(digit_key(&key(KeyCode::Char('0'), KeyEventKind::Press)), None);
    }
}
