use anyhow::Result;
use ratatui::prelude::*;
use rusqlite::Connection;

use super::app::App;
use super::editor;
use super::event::{self, Action};
use super::input::{Input, KeySource};
use super::picker;
use super::row::Row;
use super::tree;
use crate::error::{self, StoreError};
use crate::model::{Priority, Workspace};
use crate::ops;

/// An entry in the workspace picker.
#[derive(Debug, Clone)]
enum WorkspaceChoice {
    Existing(Workspace),
    CreateNew,
}

impl WorkspaceChoice {
    fn label(&self, current: i64) -> String {
        match self {
            Self::Existing(ws) if ws.id == current => format!("{} (current)", ws.name),
            Self::Existing(ws) => ws.name.clone(),
            Self::CreateNew => "+ New workspace".into(),
        }
    }
}

/// The tree view's event loop.
///
/// Owns the session state; the terminal, key source and connection are
/// borrowed for the length of the session.
pub struct Controller<'a, B: Backend, K: KeySource> {
    terminal: &'a mut Terminal<B>,
    keys: &'a mut K,
    conn: &'a Connection,
    app: App,
}

impl<'a, B: Backend, K: KeySource> Controller<'a, B, K> {
    pub fn new(
        terminal: &'a mut Terminal<B>,
        keys: &'a mut K,
        conn: &'a Connection,
        workspace: Workspace,
    ) -> Result<Self> {
        let app = App::new(conn, workspace)?;
        Ok(Self {
            terminal,
            keys,
            conn,
            app,
        })
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    /// Run until the user quits. Only terminal and input failures end the
    /// loop with an error.
    pub fn run(&mut self) -> Result<()> {
        log::info!("tree view started in workspace {}", self.app.workspace.name);
        loop {
            self.reconcile()?;
            let app = &self.app;
            self.terminal.draw(|frame| tree::render(frame, app))?;

            let key = match self.keys.next_input()? {
                Input::Key(key) => key,
                Input::Resize(cols, rows) => {
                    log::debug!("resized to {cols}x{rows}");
                    continue;
                }
            };
            match event::action_for(key) {
                Action::Quit => {
                    log::info!("tree view closed");
                    return Ok(());
                }
                Action::None => {}
                action => {
                    self.app.status = None;
                    self.perform(action)?;
                }
            }
        }
    }

    fn reconcile(&mut self) -> Result<()> {
        let height = tree::list_height(self.terminal.size()?.height);
        self.app.reconcile(height);
        log::debug!(
            "cursor {} scroll {} of {} rows",
            self.app.view.cursor,
            self.app.view.scroll,
            self.app.rows.len()
        );
        Ok(())
    }

    fn perform(&mut self, action: Action) -> Result<()> {
        let len = self.app.rows.len();
        match action {
            Action::Up => self.app.view.move_up(),
            Action::Down => self.app.view.move_down(len),
            Action::Top => self.app.view.top(),
            Action::Bottom => self.app.view.bottom(len),
            Action::Activate => self.activate(),
            Action::NewTask => self.new_task()?,
            Action::NewStep => self.new_step()?,
            Action::Edit => self.edit_selected()?,
            Action::EditNote => self.edit_note()?,
            Action::Delete => self.delete_selected(),
            Action::CyclePriority => self.cycle_priority(),
            Action::CycleTaskStatus => self.cycle_task_status(),
            Action::Search => self.search()?,
            Action::SwitchWorkspace => self.switch_workspace()?,
            Action::Quit | Action::None => {}
        }
        Ok(())
    }

    // ── Helpers ────────────────────────────────────────────────────────

    /// Run a store call, turning failures into a status message.
    /// Stale ids are ignored.
    fn store<T>(&mut self, f: impl FnOnce(&Connection) -> Result<T>) -> Option<T> {
        match f(self.conn) {
            Ok(v) => Some(v),
            Err(e) => {
                self.degrade(e);
                None
            }
        }
    }

    fn degrade(&mut self, err: anyhow::Error) {
        if error::is_not_found(&err) {
            log::debug!("ignoring stale reference: {err}");
            return;
        }
        log::warn!("action failed: {err:#}");
        self.app.status = Some(format!("Error: {err}"));
    }

    fn refresh(&mut self) {
        if let Err(e) = self.app.refresh(self.conn) {
            self.degrade(e);
        }
    }

    fn prompt(&mut self, prompt: &str, prefill: &str) -> Result<Option<String>> {
        let app = &self.app;
        editor::edit(
            &mut *self.terminal,
            &mut *self.keys,
            |frame| tree::render(frame, app),
            prompt,
            prefill,
        )
    }

    /// Prompt and keep only non-blank, trimmed answers.
    fn prompt_nonblank(&mut self, prompt: &str, prefill: &str) -> Result<Option<String>> {
        Ok(self
            .prompt(prompt, prefill)?
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()))
    }

    fn set_status(&mut self, msg: impl Into<String>) {
        self.app.status = Some(msg.into());
    }

    fn task_name(&self, task_id: i64) -> Option<String> {
        self.app.rows.iter().find_map(|r| match r {
            Row::Task(t) if t.id == task_id => Some(t.name.clone()),
            _ => None,
        })
    }

    // ── Actions ────────────────────────────────────────────────────────

    fn activate(&mut self) {
        match self.app.selected().cloned() {
            Some(Row::Task(t)) => {
                self.app.toggle_collapse(t.id);
                self.refresh();
            }
            Some(Row::Step(s)) => {
                let done = !s.done;
                if self.store(|c| ops::set_step_done(c, s.id, done)).is_some() {
                    log::info!("step {} done={done}", s.id);
                    let verb = if done { "Completed" } else { "Unchecked" };
                    self.set_status(format!("{verb}: {}", s.text));
                }
                self.refresh();
            }
            None => {}
        }
    }

    fn new_task(&mut self) -> Result<()> {
        let Some(name) = self.prompt_nonblank("New task: ", "")? else {
            return Ok(());
        };
        let ws_id = self.app.workspace.id;
        if let Some(task) = self.store(|c| ops::create_task(c, ws_id, &name)) {
            log::info!("created task {} in workspace {ws_id}", task.id);
            self.set_status(format!("Created task: {}", task.name));
        }
        self.refresh();
        Ok(())
    }

    fn new_step(&mut self) -> Result<()> {
        let Some(task_id) = self.app.selected().map(Row::owning_task_id) else {
            self.set_status("Create a task first (A)");
            return Ok(());
        };
        let Some(text) = self.prompt_nonblank("New step: ", "")? else {
            return Ok(());
        };
        if let Some(step) = self.store(|c| ops::create_step(c, task_id, &text, Priority::Medium, "")) {
            log::info!("created step {} under task {task_id}", step.id);
            self.app.collapsed.remove(&task_id);
            self.set_status(format!("Added: {}", step.text));
        }
        self.refresh();
        Ok(())
    }

    fn edit_selected(&mut self) -> Result<()> {
        match self.app.selected().cloned() {
            Some(Row::Task(t)) => {
                let Some(name) = self.prompt_nonblank("Edit task: ", &t.name)? else {
                    return Ok(());
                };
                if self.store(|c| ops::rename_task(c, t.id, &name)).is_some() {
                    log::info!("renamed task {}", t.id);
                    self.set_status("Updated task");
                }
            }
            Some(Row::Step(s)) => {
                let Some(text) = self.prompt_nonblank("Edit step: ", &s.text)? else {
                    return Ok(());
                };
                if self.store(|c| ops::update_step_text(c, s.id, &text)).is_some() {
                    log::info!("edited step {}", s.id);
                    self.set_status("Updated step");
                }
            }
            None => return Ok(()),
        }
        self.refresh();
        Ok(())
    }

    fn edit_note(&mut self) -> Result<()> {
        let Some(Row::Step(s)) = self.app.selected().cloned() else {
            return Ok(());
        };
        let Some(step) = self.store(|c| ops::get_step(c, s.id)) else {
            self.refresh();
            return Ok(());
        };
        let Some(note) = self.prompt("Note: ", &step.note)? else {
            return Ok(());
        };
        let note = note.trim();
        if self.store(|c| ops::set_step_note(c, s.id, note)).is_some() {
            log::info!("set note on step {}", s.id);
            self.set_status(if note.is_empty() { "Note cleared" } else { "Note saved" });
        }
        Ok(())
    }

    fn delete_selected(&mut self) {
        match self.app.selected().cloned() {
            Some(Row::Task(t)) => {
                if self.store(|c| ops::delete_task(c, t.id)).is_some() {
                    log::info!("deleted task {}", t.id);
                    self.set_status(format!("Deleted task: {}", t.name));
                }
                self.app.collapsed.remove(&t.id);
            }
            Some(Row::Step(s)) => {
                if self.store(|c| ops::delete_step(c, s.id)).is_some() {
                    log::info!("deleted step {}", s.id);
                    self.set_status(format!("Deleted: {}", s.text));
                }
            }
            None => return,
        }
        self.refresh();
    }

    fn cycle_priority(&mut self) {
        let Some(Row::Step(s)) = self.app.selected().cloned() else {
            return;
        };
        if let Some(p) = self.store(|c| ops::cycle_step_priority(c, s.id)) {
            log::info!("step {} priority={p}", s.id);
            self.set_status(format!("Priority: {p}"));
        }
        self.refresh();
    }

    fn cycle_task_status(&mut self) {
        let Some(task_id) = self.app.selected().map(Row::owning_task_id) else {
            return;
        };
        let name = self.task_name(task_id).unwrap_or_default();
        if let Some(status) = self.store(|c| ops::cycle_task_status(c, task_id)) {
            log::info!("task {task_id} status={status}");
            self.set_status(format!("Task '{name}' is now {status}"));
        }
        self.refresh();
    }

    fn search(&mut self) -> Result<()> {
        let prefill = self.app.query.clone();
        let query = self
            .prompt("Search: ", &prefill)?
            .map(|q| q.trim().to_string())
            .unwrap_or_default();
        self.app.set_query(query);
        self.refresh();
        Ok(())
    }

    fn switch_workspace(&mut self) -> Result<()> {
        let Some(workspaces) = self.store(ops::list_workspaces) else {
            return Ok(());
        };
        let mut choices: Vec<WorkspaceChoice> =
            workspaces.into_iter().map(WorkspaceChoice::Existing).collect();
        choices.push(WorkspaceChoice::CreateNew);

        let current = self.app.workspace.id;
        let app = &self.app;
        let picked = picker::pick(
            &mut *self.terminal,
            &mut *self.keys,
            |frame| tree::render(frame, app),
            "Switch workspace",
            &choices,
            |choice| choice.label(current),
        )?
        .cloned();

        match picked {
            Some(WorkspaceChoice::Existing(ws)) => {
                let name = ws.name.clone();
                match self.app.switch_to(self.conn, ws) {
                    Ok(()) => self.set_status(format!("Switched to: {name}")),
                    Err(e) => self.degrade(e),
                }
            }
            Some(WorkspaceChoice::CreateNew) => {
                let Some(name) = self.prompt_nonblank("Workspace name: ", "")? else {
                    return Ok(());
                };
                match ops::create_workspace(self.conn, &name) {
                    Ok(ws) => {
                        log::info!("created workspace {} ({})", ws.name, ws.id);
                        match self.app.switch_to(self.conn, ws) {
                            Ok(()) => self.set_status(format!("Created workspace: {name}")),
                            Err(e) => self.degrade(e),
                        }
                    }
                    Err(e) => match e.downcast_ref::<StoreError>() {
                        Some(StoreError::DuplicateWorkspace(n)) => {
                            log::info!("workspace {n} already exists");
                            self.set_status(format!("Workspace '{n}' already exists"));
                        }
                        _ => self.degrade(e),
                    },
                }
            }
            None => {}
        }
        Ok(())
    }
}
