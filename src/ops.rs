use anyhow::Result;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, OptionalExtension};

use crate::error::StoreError;
use crate::model::{Priority, Step, StepFilter, Task, TaskStatus, Workspace};

impl FromSql for TaskStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        TaskStatus::parse(value.as_str()?).map_err(|e| FromSqlError::Other(e.into()))
    }
}

impl ToSql for TaskStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Priority {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Priority::parse(value.as_str()?).map_err(|e| FromSqlError::Other(e.into()))
    }
}

impl ToSql for Priority {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

const WORKSPACE_COLUMNS: &str = "id, name, created_at";
const TASK_COLUMNS: &str = "id, workspace_id, name, status, created_at";
const STEP_COLUMNS: &str = "id, task_id, text, done, priority, note, created_at, completed_at";

/// Pending steps first, then high -> low priority, then creation order.
const STEP_RANK: &str =
    "ORDER BY done, CASE priority WHEN 'high' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END, id";

fn workspace_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Workspace> {
    Ok(Workspace {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
    })
}

fn task_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        workspace_id: row.get(1)?,
        name: row.get(2)?,
        status: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn step_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Step> {
    Ok(Step {
        id: row.get(0)?,
        task_id: row.get(1)?,
        text: row.get(2)?,
        done: row.get::<_, i64>(3)? != 0,
        priority: row.get(4)?,
        note: row.get(5)?,
        created_at: row.get(6)?,
        completed_at: row.get(7)?,
    })
}

// ── Workspaces ─────────────────────────────────────────────────────────

pub fn list_workspaces(conn: &Connection) -> Result<Vec<Workspace>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {WORKSPACE_COLUMNS} FROM workspaces ORDER BY id"
    ))?;
    let rows = stmt.query_map([], workspace_from_row)?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(Into::into)
}

pub fn get_workspace(conn: &Connection, id: i64) -> Result<Workspace> {
    conn.query_row(
        &format!("SELECT {WORKSPACE_COLUMNS} FROM workspaces WHERE id = ?1"),
        [id],
        workspace_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::WorkspaceNotFound(id.to_string()).into())
}

fn find_workspace_by_name(conn: &Connection, name: &str) -> Result<Option<Workspace>> {
    let ws = conn
        .query_row(
            &format!("SELECT {WORKSPACE_COLUMNS} FROM workspaces WHERE name = ?1"),
            [name],
            workspace_from_row,
        )
        .optional()?;
    Ok(ws)
}

/// Look a workspace up by numeric id or by exact name.
pub fn resolve_workspace(conn: &Connection, name_or_id: &str) -> Result<Workspace> {
    if !name_or_id.is_empty() && name_or_id.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(id) = name_or_id.parse::<i64>() {
            return get_workspace(conn, id)
                .map_err(|_| StoreError::WorkspaceNotFound(name_or_id.to_string()).into());
        }
    }
    find_workspace_by_name(conn, name_or_id)?
        .ok_or_else(|| StoreError::WorkspaceNotFound(name_or_id.to_string()).into())
}

/// The workspace the tree view opens in when none is requested.
pub fn first_workspace(conn: &Connection) -> Result<Workspace> {
    conn.query_row(
        &format!("SELECT {WORKSPACE_COLUMNS} FROM workspaces ORDER BY id LIMIT 1"),
        [],
        workspace_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::WorkspaceNotFound("(any)".into()).into())
}

pub fn create_workspace(conn: &Connection, name: &str) -> Result<Workspace> {
    if find_workspace_by_name(conn, name)?.is_some() {
        return Err(StoreError::DuplicateWorkspace(name.to_string()).into());
    }
    conn.execute("INSERT INTO workspaces (name) VALUES (?1)", [name])?;
    get_workspace(conn, conn.last_insert_rowid())
}

/// Delete a workspace and, through the foreign keys, its tasks and steps.
pub fn delete_workspace(conn: &Connection, id: i64) -> Result<()> {
    let changed = conn.execute("DELETE FROM workspaces WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(StoreError::WorkspaceNotFound(id.to_string()).into());
    }
    Ok(())
}

// ── Tasks ──────────────────────────────────────────────────────────────

/// Tasks of one workspace.
///
/// With a status filter the result is in creation order; without one it is
/// grouped in_progress, active, done (creation order within each group).
pub fn list_tasks(
    conn: &Connection,
    workspace_id: i64,
    status: Option<TaskStatus>,
) -> Result<Vec<Task>> {
    let tasks = match status {
        Some(s) => {
            let mut stmt = conn.prepare_cached(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE workspace_id = ?1 AND status = ?2 ORDER BY id"
            ))?;
            let rows = stmt.query_map(rusqlite::params![workspace_id, s], task_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        }
        None => {
            let mut stmt = conn.prepare_cached(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE workspace_id = ?1 \
                 ORDER BY CASE status WHEN 'in_progress' THEN 0 WHEN 'active' THEN 1 ELSE 2 END, id"
            ))?;
            let rows = stmt.query_map([workspace_id], task_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        }
    };
    Ok(tasks)
}

/// Tasks across every workspace, in creation order.
pub fn list_all_tasks(conn: &Connection, status: Option<TaskStatus>) -> Result<Vec<Task>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE ?1 IS NULL OR status = ?1 ORDER BY id"
    ))?;
    let rows = stmt.query_map([status], task_from_row)?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(Into::into)
}

pub fn get_task(conn: &Connection, id: i64) -> Result<Task> {
    conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
        [id],
        task_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::TaskNotFound(id).into())
}

pub fn create_task(conn: &Connection, workspace_id: i64, name: &str) -> Result<Task> {
    get_workspace(conn, workspace_id)?;
    conn.execute(
        "INSERT INTO tasks (workspace_id, name) VALUES (?1, ?2)",
        rusqlite::params![workspace_id, name],
    )?;
    get_task(conn, conn.last_insert_rowid())
}

pub fn rename_task(conn: &Connection, id: i64, name: &str) -> Result<()> {
    let changed = conn.execute(
        "UPDATE tasks SET name = ?1 WHERE id = ?2",
        rusqlite::params![name, id],
    )?;
    if changed == 0 {
        return Err(StoreError::TaskNotFound(id).into());
    }
    Ok(())
}

pub fn set_task_status(conn: &Connection, id: i64, status: TaskStatus) -> Result<()> {
    let changed = conn.execute(
        "UPDATE tasks SET status = ?1 WHERE id = ?2",
        rusqlite::params![status, id],
    )?;
    if changed == 0 {
        return Err(StoreError::TaskNotFound(id).into());
    }
    Ok(())
}

/// Advance a task to its next status and return it.
pub fn cycle_task_status(conn: &Connection, id: i64) -> Result<TaskStatus> {
    let next = get_task(conn, id)?.status.next();
    set_task_status(conn, id, next)?;
    Ok(next)
}

/// Delete a task together with its steps.
pub fn delete_task(conn: &Connection, id: i64) -> Result<()> {
    let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(StoreError::TaskNotFound(id).into());
    }
    Ok(())
}

// ── Steps ──────────────────────────────────────────────────────────────

/// Steps of a task in creation order.
pub fn list_steps(conn: &Connection, task_id: i64, filter: StepFilter) -> Result<Vec<Step>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {STEP_COLUMNS} FROM steps WHERE task_id = ?1{} ORDER BY id",
        filter.sql_clause()
    ))?;
    let rows = stmt.query_map([task_id], step_from_row)?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(Into::into)
}

/// Steps of a task, pending first and by priority.
pub fn list_steps_ranked(
    conn: &Connection,
    task_id: i64,
    filter: StepFilter,
) -> Result<Vec<Step>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {STEP_COLUMNS} FROM steps WHERE task_id = ?1{} {STEP_RANK}",
        filter.sql_clause()
    ))?;
    let rows = stmt.query_map([task_id], step_from_row)?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(Into::into)
}

pub fn list_all_steps(conn: &Connection, filter: StepFilter) -> Result<Vec<Step>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {STEP_COLUMNS} FROM steps WHERE 1 = 1{} ORDER BY id",
        filter.sql_clause()
    ))?;
    let rows = stmt.query_map([], step_from_row)?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(Into::into)
}

pub fn get_step(conn: &Connection, id: i64) -> Result<Step> {
    conn.query_row(
        &format!("SELECT {STEP_COLUMNS} FROM steps WHERE id = ?1"),
        [id],
        step_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::StepNotFound(id).into())
}

/// `(total, done)` step counts for a task.
pub fn count_steps(conn: &Connection, task_id: i64) -> Result<(usize, usize)> {
    let (total, done): (i64, Option<i64>) = conn.query_row(
        "SELECT COUNT(*), SUM(done) FROM steps WHERE task_id = ?1",
        [task_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok((total as usize, done.unwrap_or(0) as usize))
}

pub fn create_step(
    conn: &Connection,
    task_id: i64,
    text: &str,
    priority: Priority,
    note: &str,
) -> Result<Step> {
    get_task(conn, task_id)?;
    conn.execute(
        "INSERT INTO steps (task_id, text, priority, note) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![task_id, text, priority, note],
    )?;
    get_step(conn, conn.last_insert_rowid())
}

pub fn update_step_text(conn: &Connection, id: i64, text: &str) -> Result<()> {
    let changed = conn.execute(
        "UPDATE steps SET text = ?1 WHERE id = ?2",
        rusqlite::params![text, id],
    )?;
    if changed == 0 {
        return Err(StoreError::StepNotFound(id).into());
    }
    Ok(())
}

pub fn set_step_note(conn: &Connection, id: i64, note: &str) -> Result<()> {
    let changed = conn.execute(
        "UPDATE steps SET note = ?1 WHERE id = ?2",
        rusqlite::params![note, id],
    )?;
    if changed == 0 {
        return Err(StoreError::StepNotFound(id).into());
    }
    Ok(())
}

/// Mark a step done (stamping `completed_at`) or pending (clearing it).
pub fn set_step_done(conn: &Connection, id: i64, done: bool) -> Result<()> {
    let changed = if done {
        conn.execute(
            "UPDATE steps SET done = 1, completed_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now') WHERE id = ?1",
            [id],
        )?
    } else {
        conn.execute(
            "UPDATE steps SET done = 0, completed_at = NULL WHERE id = ?1",
            [id],
        )?
    };
    if changed == 0 {
        return Err(StoreError::StepNotFound(id).into());
    }
    Ok(())
}

/// Advance a step's priority low -> medium -> high -> low and return it.
pub fn cycle_step_priority(conn: &Connection, id: i64) -> Result<Priority> {
    let next = get_step(conn, id)?.priority.next();
    conn.execute(
        "UPDATE steps SET priority = ?1 WHERE id = ?2",
        rusqlite::params![next, id],
    )?;
    Ok(next)
}

pub fn delete_step(conn: &Connection, id: i64) -> Result<()> {
    let changed = conn.execute("DELETE FROM steps WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(StoreError::StepNotFound(id).into());
    }
    Ok(())
}
