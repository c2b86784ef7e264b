use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::input::{is_interrupt, Input, KeySource};
use super::tree::truncate;
use super::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    Continue,
    Select(usize),
    Cancel,
}

/// Selection state over `len` items.
#[derive(Debug, Clone, Copy, Default)]
pub struct Picker {
    pub view: Viewport,
    pub len: usize,
}

impl Picker {
    pub fn new(len: usize) -> Self {
        Self {
            view: Viewport::default(),
            len,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PickOutcome {
        if is_interrupt(&key) {
            return PickOutcome::Cancel;
        }
        match key.code {
            KeyCode::Char('k') | KeyCode::Up => self.view.move_up(),
            KeyCode::Char('j') | KeyCode::Down => self.view.move_down(self.len),
            KeyCode::Enter if self.len > 0 => return PickOutcome::Select(self.view.cursor),
            KeyCode::Esc => return PickOutcome::Cancel,
            _ => {}
        }
        PickOutcome::Continue
    }
}

/// Center a rectangle within an area.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Popup rectangle for `len` items: at most 50 wide, as tall as the list
/// plus borders, always leaving a margin of two cells.
fn popup_area(area: Rect, len: usize) -> Rect {
    let width = 50.min(area.width.saturating_sub(4));
    let wanted = u16::try_from(len).unwrap_or(u16::MAX).saturating_add(2);
    let height = wanted.min(area.height.saturating_sub(4)).max(3.min(area.height));
    centered_rect(width, height, area)
}

fn render_popup(frame: &mut Frame, title: &str, labels: &[String], picker: &mut Picker) {
    let area = popup_area(frame.area(), labels.len());
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {title} "))
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let height = inner.height as usize;
    picker.view.reconcile(labels.len(), height);
    let width = inner.width as usize;

    for (i, label) in labels
        .iter()
        .enumerate()
        .skip(picker.view.scroll)
        .take(height)
    {
        let selected = i == picker.view.cursor;
        let marker = if selected { "> " } else { "  " };
        let text = truncate(&format!("{marker}{label}"), width);
        let style = if selected {
            Style::default().fg(Color::Cyan).bold()
        } else {
            Style::default()
        };
        let y = inner.y + (i - picker.view.scroll) as u16;
        frame.render_widget(
            Paragraph::new(text).style(style),
            Rect::new(inner.x, y, inner.width, 1),
        );
    }
}

/// Run a modal pick over `items`. Returns the chosen item or `None` when
/// cancelled.
pub fn pick<'a, B, K, F, T, L>(
    terminal: &mut Terminal<B>,
    keys: &mut K,
    backdrop: F,
    title: &str,
    items: &'a [T],
    label: L,
) -> Result<Option<&'a T>>
where
    B: Backend,
    K: KeySource,
    F: Fn(&mut Frame),
    L: Fn(&T) -> String,
{
    let labels: Vec<String> = items.iter().map(label).collect();
    let mut picker = Picker::new(items.len());
    loop {
        terminal.draw(|frame| {
            backdrop(frame);
            render_popup(frame, title, &labels, &mut picker);
        })?;
        let key = match keys.next_input()? {
            Input::Key(key) => key,
            Input::Resize(..) => continue,
        };
        match picker.handle_key(key) {
            PickOutcome::Continue => {}
            PickOutcome::Select(i) => return Ok(items.get(i)),
            PickOutcome::Cancel => return Ok(None),
        }
    }
}
