use std::collections::{HashMap, HashSet};

use anyhow::Result;
use rusqlite::Connection;

use super::row::{Row, StepRow, TaskRow};
use crate::model::{Step, StepFilter, Task, TaskStatus};
use crate::ops;

/// Flatten tasks and their steps into display rows.
///
/// Only `active` tasks appear. An empty `query` shows every step of every
/// expanded task. A non-empty query (case-insensitive substring) keeps a
/// task when its name or any of its steps matches; a name match shows all
/// of its steps, otherwise only the matching ones. Collapsed tasks never
/// show steps. Step counts on the task row always cover every step.
pub fn flatten(
    tasks: &[Task],
    steps_by_task: &HashMap<i64, Vec<Step>>,
    collapsed: &HashSet<i64>,
    query: &str,
) -> Vec<Row> {
    let needle = query.to_lowercase();
    let matches = |s: &str| s.to_lowercase().contains(&needle);

    let mut rows = Vec::new();
    for task in tasks.iter().filter(|t| t.status == TaskStatus::Active) {
        let steps = steps_by_task
            .get(&task.id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let visible: Vec<&Step> = if needle.is_empty() || matches(&task.name) {
            steps.iter().collect()
        } else {
            let hits: Vec<&Step> = steps.iter().filter(|s| matches(&s.text)).collect();
            if hits.is_empty() {
                continue;
            }
            hits
        };

        let is_collapsed = collapsed.contains(&task.id);
        rows.push(Row::Task(TaskRow {
            id: task.id,
            name: task.name.clone(),
            done: steps.iter().filter(|s| s.done).count(),
            total: steps.len(),
            collapsed: is_collapsed,
        }));
        if is_collapsed {
            continue;
        }
        rows.extend(visible.into_iter().map(|s| {
            Row::Step(StepRow {
                id: s.id,
                task_id: s.task_id,
                text: s.text.clone(),
                done: s.done,
                priority: s.priority,
            })
        }));
    }
    rows
}

/// Read a workspace from the store and flatten it.
pub fn load_rows(
    conn: &Connection,
    workspace_id: i64,
    collapsed: &HashSet<i64>,
    query: &str,
) -> Result<Vec<Row>> {
    let tasks = ops::list_tasks(conn, workspace_id, Some(TaskStatus::Active))?;
    let mut steps_by_task = HashMap::new();
    for task in &tasks {
        steps_by_task.insert(task.id, ops::list_steps(conn, task.id, StepFilter::All)?);
    }
    let rows = flatten(&tasks, &steps_by_task, collapsed, query);
    log::debug!(
        "flattened workspace {workspace_id}: {} tasks, {} rows, query {query:?}",
        tasks.len(),
        rows.len()
    );
    Ok(rows)
}
