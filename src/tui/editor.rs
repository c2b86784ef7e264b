use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Position;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthChar;

use super::input::{is_interrupt, Input, KeySource};

/// What a key did to the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Continue,
    Commit(String),
    Cancel,
}

/// Single-line buffer with a cursor.
#[derive(Debug, Clone, Default)]
pub struct TextEditor {
    buf: Vec<char>,
    cursor: usize,
}

impl TextEditor {
    /// Start with `prefill` and the cursor at its end.
    pub fn new(prefill: &str) -> Self {
        let buf: Vec<char> = prefill.chars().collect();
        let cursor = buf.len();
        Self { buf, cursor }
    }

    pub fn text(&self) -> String {
        self.buf.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> EditOutcome {
        if is_interrupt(&key) {
            return EditOutcome::Cancel;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => return EditOutcome::Commit(self.text()),
            KeyCode::Esc => return EditOutcome::Cancel,
            KeyCode::Char('u') if ctrl => {
                self.buf.clear();
                self.cursor = 0;
            }
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                self.buf.insert(self.cursor, c);
                self.cursor += 1;
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.buf.remove(self.cursor);
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.buf.len() {
                    self.buf.remove(self.cursor);
                }
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.buf.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.buf.len(),
            _ => {}
        }
        EditOutcome::Continue
    }

    /// First char to show so the cursor fits in `width` columns.
    fn window_start(&self, width: usize) -> usize {
        let mut start = 0;
        let mut used: usize = self.buf[..self.cursor]
            .iter()
            .map(|c| c.width().unwrap_or(0))
            .sum();
        // Leave a column for the cursor itself.
        while start < self.cursor && used + 1 > width {
            used -= self.buf[start].width().unwrap_or(0);
            start += 1;
        }
        start
    }
}

/// Draw the prompt line: `prompt` followed by the buffer, with the terminal
/// cursor placed at the edit position.
fn render_prompt(frame: &mut Frame, prompt: &str, editor: &TextEditor) {
    let area = frame.area();
    if area.height < 2 {
        return;
    }
    let line_area = Rect::new(area.x, area.y + area.height - 2, area.width, 1);
    let prompt_w = prompt.chars().map(|c| c.width().unwrap_or(0)).sum::<usize>();
    let avail = (line_area.width as usize).saturating_sub(prompt_w);
    let start = editor.window_start(avail);
    let shown: String = editor.buf[start..].iter().collect();

    let line = Line::from(vec![
        Span::styled(prompt.to_string(), Style::default().fg(Color::Cyan).bold()),
        Span::raw(shown),
    ]);
    frame.render_widget(Paragraph::new(line), line_area);

    let before: usize = editor.buf[start..editor.cursor]
        .iter()
        .map(|c| c.width().unwrap_or(0))
        .sum();
    let x = (prompt_w + before).min(line_area.width.saturating_sub(1) as usize) as u16;
    frame.set_cursor_position(Position::new(line_area.x + x, line_area.y));
}

/// Run a modal edit. Returns the committed text (possibly empty) or `None`
/// when cancelled. `backdrop` redraws whatever sits behind the prompt.
pub fn edit<B, K, F>(
    terminal: &mut Terminal<B>,
    keys: &mut K,
    backdrop: F,
    prompt: &str,
    prefill: &str,
) -> Result<Option<String>>
where
    B: Backend,
    K: KeySource,
    F: Fn(&mut Frame),
{
    let mut editor = TextEditor::new(prefill);
    loop {
        terminal.draw(|frame| {
            backdrop(frame);
            render_prompt(frame, prompt, &editor);
        })?;
        let key = match keys.next_input()? {
            Input::Key(key) => key,
            Input::Resize(..) => continue,
        };
        match editor.handle_key(key) {
            EditOutcome::Continue => {}
            EditOutcome::Commit(text) => return Ok(Some(text)),
            EditOutcome::Cancel => return Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::input::ScriptedKeys;
    use crate::tui::test_helpers::{blank, buffer_lines, key};
    use ratatui::backend::TestBackend;

    fn typed(prefill: &str, codes: &[KeyCode]) -> TextEditor {
        let mut ed = TextEditor::new(prefill);
        for code in codes {
            assert_eq!(ed.handle_key(key(*code)), EditOutcome::Continue);
        }
        ed
    }

    #[test]
    fn prefill_puts_cursor_at_end() {
        let ed = TextEditor::new("héllo");
        assert_eq!(ed.cursor(), 5);
        assert_eq!(ed.text(), "héllo");
    }

    #[test]
    fn insert_in_the_middle() {
        let ed = typed("ac", &[KeyCode::Left, KeyCode::Char('b')]);
        assert_eq!(ed.text(), "abc");
        assert_eq!(ed.cursor(), 2);
    }

    #[test]
    fn backspace_and_delete() {
        let ed = typed("abcd", &[KeyCode::Left, KeyCode::Backspace]);
        assert_eq!(ed.text(), "abd");
        assert_eq!(ed.cursor(), 2);
        let ed = typed("abcd", &[KeyCode::Home, KeyCode::Delete]);
        assert_eq!(ed.text(), "bcd");
        assert_eq!(ed.cursor(), 0);
    }

    #[test]
    fn edits_at_bounds_are_no_ops() {
        let ed = typed("ab", &[KeyCode::Delete, KeyCode::Right]);
        assert_eq!((ed.text().as_str(), ed.cursor()), ("ab", 2));
        let ed = typed("ab", &[KeyCode::Home, KeyCode::Backspace, KeyCode::Left]);
        assert_eq!((ed.text().as_str(), ed.cursor()), ("ab", 0));
    }

    #[test]
    fn home_end_jump() {
        let ed = typed("abc", &[KeyCode::Home, KeyCode::Char('x'), KeyCode::End, KeyCode::Char('y')]);
        assert_eq!(ed.text(), "xabcy");
    }

    #[test]
    fn ctrl_u_clears() {
        let mut ed = TextEditor::new("junk");
        let ctrl_u = KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL);
        assert_eq!(ed.handle_key(ctrl_u), EditOutcome::Continue);
        assert_eq!(ed.text(), "");
        assert_eq!(ed.cursor(), 0);
    }

    #[test]
    fn commit_returns_buffer_even_when_empty() {
        let mut ed = TextEditor::new("");
        assert_eq!(ed.handle_key(key(KeyCode::Enter)), EditOutcome::Commit(String::new()));
    }

    #[test]
    fn escape_and_ctrl_c_cancel() {
        let mut ed = TextEditor::new("keep?");
        assert_eq!(ed.handle_key(key(KeyCode::Esc)), EditOutcome::Cancel);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(ed.handle_key(ctrl_c), EditOutcome::Cancel);
    }

    #[test]
    fn window_scrolls_to_keep_cursor_visible() {
        let ed = TextEditor::new("abcdefghij");
        assert_eq!(ed.window_start(20), 0);
        assert_eq!(ed.window_start(5), 6);
    }

    #[test]
    fn edit_draws_prompt_and_commits() {
        let mut terminal = Terminal::new(TestBackend::new(30, 6)).unwrap();
        let mut keys = ScriptedKeys::default();
        keys.type_str("ilk");
        keys.press(KeyCode::Home);
        keys.type_str("m");
        keys.push(Input::Resize(30, 6));
        keys.press(KeyCode::Enter);

        let got = edit(&mut terminal, &mut keys, blank, "New step: ", "").unwrap();
        assert_eq!(got.as_deref(), Some("milk"));
        assert_eq!(keys.remaining(), 0);

        let lines = buffer_lines(&terminal);
        assert_eq!(lines[4], "New step: milk");
    }

    #[test]
    fn edit_cancel_discards() {
        let mut terminal = Terminal::new(TestBackend::new(30, 6)).unwrap();
        let mut keys = ScriptedKeys::default();
        keys.type_str("xyz");
        keys.press(KeyCode::Esc);
        let got = edit(&mut terminal, &mut keys, blank, "Edit: ", "old").unwrap();
        assert_eq!(got, None);
    }

    #[test]
    fn edit_keeps_backdrop() {
        let mut terminal = Terminal::new(TestBackend::new(20, 4)).unwrap();
        let mut keys = ScriptedKeys::default();
        keys.press(KeyCode::Enter);
        edit(
            &mut terminal,
            &mut keys,
            |frame| frame.render_widget(Paragraph::new("behind"), Rect::new(0, 0, 20, 1)),
            "> ",
            "x",
        )
        .unwrap();
        let lines = buffer_lines(&terminal);
        assert_eq!(lines[0], "behind");
        assert_eq!(lines[2], "> x");
    }
}
