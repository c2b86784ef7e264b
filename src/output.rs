use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

use crate::model::{Step, StepFilter, Task, TaskStatus, Workspace};
use crate::ops;

/// A task with its step counts, as printed by `task list`.
#[derive(Debug, Serialize)]
pub struct TaskSummary {
    #[serde(flatten)]
    pub task: Task,
    pub steps_total: usize,
    pub steps_done: usize,
}

#[derive(Debug, Serialize)]
pub struct TaskDump {
    #[serde(flatten)]
    pub summary: TaskSummary,
    pub steps: Vec<Step>,
}

#[derive(Debug, Serialize)]
pub struct WorkspaceDump {
    #[serde(flatten)]
    pub workspace: Workspace,
    pub tasks: Vec<TaskDump>,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: i64,
}

#[derive(Debug, Serialize)]
pub struct StatusChange {
    pub id: i64,
    pub status: TaskStatus,
}

#[derive(Debug, Serialize)]
pub struct DoneChange {
    pub id: i64,
    pub done: bool,
}

pub fn summarize(conn: &Connection, task: Task) -> Result<TaskSummary> {
    let (steps_total, steps_done) = ops::count_steps(conn, task.id)?;
    Ok(TaskSummary {
        task,
        steps_total,
        steps_done,
    })
}

pub fn dump_workspace(conn: &Connection, workspace: Workspace) -> Result<WorkspaceDump> {
    let mut tasks = Vec::new();
    for task in ops::list_tasks(conn, workspace.id, None)? {
        let steps = ops::list_steps_ranked(conn, task.id, StepFilter::All)?;
        tasks.push(TaskDump {
            summary: summarize(conn, task)?,
            steps,
        });
    }
    Ok(WorkspaceDump { workspace, tasks })
}

pub fn dump_all(conn: &Connection) -> Result<Vec<WorkspaceDump>> {
    ops::list_workspaces(conn)?
        .into_iter()
        .map(|ws| dump_workspace(conn, ws))
        .collect()
}

/// Pretty JSON for stdout.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
