use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Active,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "active" => Ok(Self::Active),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => anyhow::bail!("invalid status '{s}': must be active, in_progress, or done"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }

    /// active -> in_progress -> done -> active
    pub fn next(self) -> Self {
        match self {
            Self::Active => Self::InProgress,
            Self::InProgress => Self::Done,
            Self::Done => Self::Active,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => anyhow::bail!("invalid priority '{s}': must be high, medium, or low"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// low -> medium -> high -> low
    pub fn next(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium => Self::High,
            Self::High => Self::Low,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which steps a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepFilter {
    Pending,
    Done,
    #[default]
    All,
}

impl StepFilter {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "done" => Ok(Self::Done),
            "all" => Ok(Self::All),
            _ => anyhow::bail!("invalid step status '{s}': must be pending, done, or all"),
        }
    }

    pub(crate) fn sql_clause(self) -> &'static str {
        match self {
            Self::Pending => " AND done = 0",
            Self::Done => " AND done = 1",
            Self::All => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workspace {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: i64,
    pub workspace_id: i64,
    pub name: String,
    pub status: TaskStatus,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub id: i64,
    pub task_id: i64,
    pub text: String,
    pub done: bool,
    pub priority: Priority,
    pub note: String,
    pub created_at: String,
    pub completed_at: Option<String>,
}
