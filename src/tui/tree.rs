use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::app::App;
use super::row::{Row, StepRow, TaskRow};
use crate::model::Priority;

const HELP: &str = " A:task  a:step  enter:toggle  e:edit  n:note  p:priority  s:status  d:del  f:search  w:workspace  q:quit ";

/// Rows above the list (title, spacer) plus rows below it (status, prompt, help).
const CHROME_ROWS: u16 = 5;
const LIST_TOP: u16 = 2;

/// Number of list rows that fit on a screen `height` rows tall.
pub fn list_height(height: u16) -> usize {
    height.saturating_sub(CHROME_ROWS).max(1) as usize
}

/// Cut `s` to at most `width` columns, ending in `…` when shortened.
pub fn truncate(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

fn line_at(area: Rect, y: u16) -> Option<Rect> {
    (y < area.height).then(|| Rect::new(area.x, area.y + y, area.width, 1))
}

fn priority_glyph(p: Priority) -> (&'static str, Color) {
    match p {
        Priority::High => ("!!!", Color::Red),
        Priority::Medium => (" ! ", Color::Yellow),
        Priority::Low => (" . ", Color::Green),
    }
}

fn task_line(task: &TaskRow, width: usize) -> Line<'static> {
    let arrow = if task.collapsed { "▸ " } else { "▾ " };
    let counts = if task.total > 0 {
        format!(" [{}/{}]", task.done, task.total)
    } else {
        String::new()
    };
    let name_width = width.saturating_sub(arrow.width() + counts.width() + 1);
    let name = truncate(&task.name, name_width);
    let pad = width.saturating_sub(1 + arrow.width() + name.width() + counts.width());

    let name_style = if task.is_complete() {
        Style::default().add_modifier(Modifier::DIM)
    } else {
        Style::default().bold()
    };
    let counts_style = if task.is_complete() {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Yellow)
    };
    Line::from(vec![
        Span::raw(" "),
        Span::raw(arrow),
        Span::styled(name, name_style),
        Span::raw(" ".repeat(pad)),
        Span::styled(counts, counts_style),
    ])
}

fn step_line(step: &StepRow, width: usize) -> Line<'static> {
    let check = if step.done { "[x] " } else { "[ ] " };
    let (glyph, color) = priority_glyph(step.priority);
    let lead = "    ";
    let text_width = width.saturating_sub(lead.len() + check.len() + glyph.len() + 1);
    let text = truncate(&step.text, text_width);
    let text_style = if step.done {
        Style::default().add_modifier(Modifier::DIM | Modifier::CROSSED_OUT)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::raw(lead),
        Span::raw(check),
        Span::styled(glyph, Style::default().fg(color)),
        Span::raw(" "),
        Span::styled(text, text_style),
    ])
}

fn render_title(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::raw(" trellis "),
        Span::raw(format!(" [{}] ", app.workspace.name)),
    ];
    if !app.query.is_empty() {
        spans.push(Span::raw(format!(" / \"{}\" ", app.query)));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().fg(Color::Black).bg(Color::Cyan).bold()),
        area,
    );
}

fn render_rows(frame: &mut Frame, app: &App, area: Rect) {
    let height = list_height(area.height);
    if app.rows.is_empty() {
        let msg = if app.query.is_empty() {
            "  No tasks yet. Press 'A' to add a task.".to_string()
        } else {
            format!("  No matches for \"{}\".", app.query)
        };
        if let Some(r) = line_at(area, LIST_TOP) {
            frame.render_widget(
                Paragraph::new(msg).style(Style::default().add_modifier(Modifier::DIM)),
                r,
            );
        }
        return;
    }

    let width = area.width as usize;
    let visible = app.rows.iter().enumerate().skip(app.view.scroll).take(height);
    for (offset, (i, row)) in visible.enumerate() {
        let Some(r) = line_at(area, LIST_TOP + offset as u16) else {
            break;
        };
        let line = match row {
            Row::Task(t) => task_line(t, width),
            Row::Step(s) => step_line(s, width),
        };
        let mut para = Paragraph::new(line);
        if i == app.view.cursor {
            para = para.style(Style::default().add_modifier(Modifier::REVERSED));
        }
        frame.render_widget(para, r);
    }
}

/// Draw the tree view. Reads `app` only.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    if area.height == 0 {
        return;
    }
    if let Some(r) = line_at(area, 0) {
        render_title(frame, app, r);
    }
    render_rows(frame, app, area);

    if area.height >= CHROME_ROWS {
        if let (Some(status), Some(r)) = (&app.status, line_at(area, area.height - 3)) {
            frame.render_widget(
                Paragraph::new(format!(" {status}"))
                    .style(Style::default().fg(Color::Yellow).bold()),
                r,
            );
        }
        if let Some(r) = line_at(area, area.height - 1) {
            frame.render_widget(
                Paragraph::new(HELP).style(Style::default().fg(Color::Black).bg(Color::White)),
                r,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Workspace;
    use crate::tui::test_helpers::buffer_lines;
    use crate::tui::viewport::Viewport;
    use ratatui::backend::TestBackend;
    use std::collections::HashSet;

    fn app_with(rows: Vec<Row>) -> App {
        App {
            workspace: Workspace {
                id: 1,
                name: "default".into(),
                created_at: String::new(),
            },
            rows,
            collapsed: HashSet::new(),
            query: String::new(),
            view: Viewport::default(),
            status: None,
        }
    }

    fn release_rows() -> Vec<Row> {
        vec![
            Row::Task(TaskRow {
                id: 1,
                name: "Ship release".into(),
                done: 1,
                total: 2,
                collapsed: false,
            }),
            Row::Step(StepRow {
                id: 10,
                task_id: 1,
                text: "write changelog".into(),
                done: false,
                priority: Priority::High,
            }),
            Row::Step(StepRow {
                id: 11,
                task_id: 1,
                text: "tag commit".into(),
                done: true,
                priority: Priority::Medium,
            }),
        ]
    }

    fn draw(app: &App, w: u16, h: u16) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(w, h)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
    }

    #[test]
    fn list_height_leaves_room_for_chrome() {
        assert_eq!(list_height(24), 19);
        assert_eq!(list_height(5), 1);
        assert_eq!(list_height(2), 1);
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 6), "hello…");
        assert_eq!(truncate("日本語", 4), "日…");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn renders_rows_and_chrome() {
        let mut app = app_with(release_rows());
        app.status = Some("Added: tag commit".into());
        let terminal = draw(&app, 50, 10);
        let lines = buffer_lines(&terminal);

        assert!(lines[0].starts_with(" trellis  [default]"));
        assert!(lines[2].starts_with(" ▾ Ship release"));
        assert!(lines[2].ends_with("[1/2]"));
        assert_eq!(lines[3], "    [ ] !!! write changelog");
        assert_eq!(lines[4], "    [x]  !  tag commit");
        assert_eq!(lines[7], " Added: tag commit");
        assert!(lines[9].starts_with(" A:task  a:step"));
    }

    #[test]
    fn cursor_row_is_reversed() {
        let mut app = app_with(release_rows());
        app.view.cursor = 1;
        let terminal = draw(&app, 40, 10);
        let buf = terminal.backend().buffer();
        assert!(buf[(5, 3)].modifier.contains(Modifier::REVERSED));
        assert!(!buf[(5, 2)].modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn done_step_is_dimmed() {
        let app = app_with(release_rows());
        let terminal = draw(&app, 40, 10);
        let buf = terminal.backend().buffer();
        let x = "    [x]  !  ".len() as u16;
        assert!(buf[(x, 4)].modifier.contains(Modifier::CROSSED_OUT));
        assert_eq!(buf[(8, 3)].fg, Color::Red);
    }

    #[test]
    fn title_shows_query() {
        let mut app = app_with(vec![]);
        app.query = "tag".into();
        let lines = buffer_lines(&draw(&app, 50, 8));
        assert!(lines[0].contains("/ \"tag\""));
        assert_eq!(lines[2], "  No matches for \"tag\".");
    }

    #[test]
    fn empty_workspace_hint() {
        let lines = buffer_lines(&draw(&app_with(vec![]), 50, 8));
        assert_eq!(lines[2], "  No tasks yet. Press 'A' to add a task.");
    }

    #[test]
    fn only_the_scrolled_window_is_drawn() {
        let rows: Vec<Row> = (0..10)
            .map(|i| {
                Row::Task(TaskRow {
                    id: i,
                    name: format!("task {i}"),
                    done: 0,
                    total: 0,
                    collapsed: false,
                })
            })
            .collect();
        let mut app = app_with(rows);
        app.view = Viewport { cursor: 6, scroll: 4 };
        // 8 rows: 3 list rows.
        let lines = buffer_lines(&draw(&app, 30, 8));
        assert_eq!(lines[2], " ▾ task 4");
        assert_eq!(lines[4], " ▾ task 6");
        assert!(!lines.iter().any(|l| l.contains("task 3") || l.contains("task 7")));
    }

    #[test]
    fn long_names_are_truncated() {
        let rows = vec![Row::Task(TaskRow {
            id: 1,
            name: "a very long task name that will not fit".into(),
            done: 0,
            total: 3,
            collapsed: true,
        })];
        let lines = buffer_lines(&draw(&app_with(rows), 24, 8));
        assert_eq!(lines[2].width(), 24);
        assert!(lines[2].contains('…'));
        assert!(lines[2].ends_with("[0/3]"));
    }

    #[test]
    fn render_is_idempotent() {
        let app = app_with(release_rows());
        let a = draw(&app, 40, 10);
        let b = draw(&app, 40, 10);
        assert_eq!(a.backend().buffer(), b.backend().buffer());
    }
}
