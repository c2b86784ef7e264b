use std::collections::VecDeque;

use anyhow::{bail, Result};
use crossterm::event::{self as ct_event, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Something the event loop reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Key(KeyEvent),
    /// New terminal size as `(cols, rows)`.
    Resize(u16, u16),
}

/// Blocking source of input for the tree view and its modal widgets.
pub trait KeySource {
    fn next_input(&mut self) -> Result<Input>;
}

/// Reads the real terminal through crossterm.
pub struct TerminalKeys;

impl KeySource for TerminalKeys {
    fn next_input(&mut self) -> Result<Input> {
        loop {
            match ct_event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => return Ok(Input::Key(key)),
                Event::Resize(cols, rows) => return Ok(Input::Resize(cols, rows)),
                _ => {}
            }
        }
    }
}

/// Replays a fixed queue of inputs.
#[derive(Debug, Default)]
pub struct ScriptedKeys {
    queue: VecDeque<Input>,
}

impl ScriptedKeys {
    pub fn new(inputs: impl IntoIterator<Item = Input>) -> Self {
        Self {
            queue: inputs.into_iter().collect(),
        }
    }

    pub fn push(&mut self, input: Input) {
        self.queue.push_back(input);
    }

    /// Queue each character of `text` as a key press.
    pub fn type_str(&mut self, text: &str) {
        for c in text.chars() {
            self.push(Input::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)));
        }
    }

    pub fn press(&mut self, code: KeyCode) {
        self.push(Input::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    pub fn ctrl(&mut self, c: char) {
        self.push(Input::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)));
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl KeySource for ScriptedKeys {
    fn next_input(&mut self) -> Result<Input> {
        match self.queue.pop_front() {
            Some(input) => Ok(input),
            None => bail!("scripted input exhausted"),
        }
    }
}

/// Ctrl-C, which quits the tree view and cancels modals.
pub fn is_interrupt(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_keys_replay_in_order_then_fail() {
        let mut keys = ScriptedKeys::default();
        keys.type_str("ab");
        keys.push(Input::Resize(80, 24));
        assert_eq!(
            keys.next_input().unwrap(),
            Input::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE))
        );
        keys.next_input().unwrap();
        assert_eq!(keys.next_input().unwrap(), Input::Resize(80, 24));
        assert!(keys.next_input().is_err());
    }

    #[test]
    fn ctrl_c_is_interrupt() {
        let mut keys = ScriptedKeys::default();
        keys.ctrl('c');
        keys.type_str("c");
        let Input::Key(k) = keys.next_input().unwrap() else { panic!() };
        assert!(is_interrupt(&k));
        let Input::Key(k) = keys.next_input().unwrap() else { panic!() };
        assert!(!is_interrupt(&k));
    }
}
