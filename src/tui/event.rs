use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::input::is_interrupt;

/// What a key press in the tree view asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    Top,
    Bottom,
    /// Collapse/expand a task, check/uncheck a step.
    Activate,
    NewTask,
    NewStep,
    Edit,
    EditNote,
    Delete,
    CyclePriority,
    CycleTaskStatus,
    Search,
    SwitchWorkspace,
    Quit,
    None,
}

pub fn action_for(key: KeyEvent) -> Action {
    if is_interrupt(&key) {
        return Action::Quit;
    }
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return Action::None;
    }
    match key.code {
        KeyCode::Char('k') | KeyCode::Up => Action::Up,
        KeyCode::Char('j') | KeyCode::Down => Action::Down,
        KeyCode::Char('g') | KeyCode::Home => Action::Top,
        KeyCode::Char('G') | KeyCode::End => Action::Bottom,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Activate,
        KeyCode::Char('A') => Action::NewTask,
        KeyCode::Char('a') => Action::NewStep,
        KeyCode::Char('e') => Action::Edit,
        KeyCode::Char('n') => Action::EditNote,
        KeyCode::Char('d') | KeyCode::Delete => Action::Delete,
        KeyCode::Char('p') => Action::CyclePriority,
        KeyCode::Char('s') => Action::CycleTaskStatus,
        KeyCode::Char('f') | KeyCode::Char('/') => Action::Search,
        KeyCode::Char('w') => Action::SwitchWorkspace,
        KeyCode::Char('q') | KeyCode::Char('Q') => Action::Quit,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::test_helpers::key;

    #[test]
    fn vim_and_arrow_keys_navigate() {
        assert_eq!(action_for(key(KeyCode::Char('j'))), Action::Down);
        assert_eq!(action_for(key(KeyCode::Down)), Action::Down);
        assert_eq!(action_for(key(KeyCode::Char('k'))), Action::Up);
        assert_eq!(action_for(key(KeyCode::Home)), Action::Top);
        assert_eq!(action_for(key(KeyCode::Char('G'))), Action::Bottom);
    }

    #[test]
    fn shifted_letters_are_distinct() {
        assert_eq!(action_for(key(KeyCode::Char('A'))), Action::NewTask);
        assert_eq!(action_for(key(KeyCode::Char('a'))), Action::NewStep);
        let shift_a = KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(action_for(shift_a), Action::NewTask);
    }

    #[test]
    fn quit_keys() {
        assert_eq!(action_for(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(action_for(key(KeyCode::Char('Q'))), Action::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(action_for(ctrl_c), Action::Quit);
        assert_eq!(action_for(key(KeyCode::Esc)), Action::None);
    }

    #[test]
    fn other_control_chords_do_nothing() {
        let ctrl_d = KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL);
        assert_eq!(action_for(ctrl_d), Action::None);
    }
}
