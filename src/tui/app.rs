use std::collections::HashSet;

use anyhow::Result;
use rusqlite::Connection;

use super::flatten;
use super::row::Row;
use super::viewport::Viewport;
use crate::model::Workspace;

/// Everything the tree view knows about the current session.
pub struct App {
    pub workspace: Workspace,
    pub rows: Vec<Row>,
    /// Task ids whose steps are hidden.
    pub collapsed: HashSet<i64>,
    pub query: String,
    pub view: Viewport,
    /// One-line message shown until the next key press.
    pub status: Option<String>,
}

impl App {
    pub fn new(conn: &Connection, workspace: Workspace) -> Result<Self> {
        let mut app = App {
            workspace,
            rows: Vec::new(),
            collapsed: HashSet::new(),
            query: String::new(),
            view: Viewport::default(),
            status: None,
        };
        app.refresh(conn)?;
        Ok(app)
    }

    /// Re-read the workspace and rebuild the rows.
    pub fn refresh(&mut self, conn: &Connection) -> Result<()> {
        self.rows = flatten::load_rows(conn, self.workspace.id, &self.collapsed, &self.query)?;
        Ok(())
    }

    /// Bring cursor and scroll back in range for a list `height` rows tall.
    pub fn reconcile(&mut self, height: usize) {
        self.view.reconcile(self.rows.len(), height);
    }

    pub fn selected(&self) -> Option<&Row> {
        self.rows.get(self.view.cursor)
    }

    pub fn toggle_collapse(&mut self, task_id: i64) {
        if !self.collapsed.remove(&task_id) {
            self.collapsed.insert(task_id);
        }
    }

    /// Replace the search query and go back to the top.
    pub fn set_query(&mut self, query: String) {
        self.query = query;
        self.view.reset();
    }

    /// Enter another workspace with a fresh collapse set and viewport.
    pub fn switch_to(&mut self, conn: &Connection, workspace: Workspace) -> Result<()> {
        log::info!("switching to workspace {} ({})", workspace.name, workspace.id);
        self.workspace = workspace;
        self.collapsed.clear();
        self.view.reset();
        self.refresh(conn)
    }
}
