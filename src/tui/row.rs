use crate::model::Priority;

/// One line of the tree view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Task(TaskRow),
    Step(StepRow),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub id: i64,
    pub name: String,
    pub done: usize,
    pub total: usize,
    pub collapsed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRow {
    pub id: i64,
    pub task_id: i64,
    pub text: String,
    pub done: bool,
    pub priority: Priority,
}

impl TaskRow {
    /// Every step is done (and there is at least one).
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.done == self.total
    }
}

impl Row {
    /// The task a new step would be added to: the row itself or its parent.
    pub fn owning_task_id(&self) -> i64 {
        match self {
            Row::Task(t) => t.id,
            Row::Step(s) => s.task_id,
        }
    }

    /// Task name or step text.
    pub fn label(&self) -> &str {
        match self {
            Row::Task(t) => &t.name,
            Row::Step(s) => &s.text,
        }
    }
}
