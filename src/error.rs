/// Store failures callers need to tell apart.
///
/// Everything else (SQLite I/O, constraint violations) travels as a plain
/// `anyhow::Error`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("workspace '{0}' already exists")]
    DuplicateWorkspace(String),
    #[error("workspace '{0}' not found")]
    WorkspaceNotFound(String),
    #[error("task {0} not found")]
    TaskNotFound(i64),
    #[error("step {0} not found")]
    StepNotFound(i64),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::WorkspaceNotFound(_) | Self::TaskNotFound(_) | Self::StepNotFound(_)
        )
    }
}

/// True when `err` is a [`StoreError`] of the not-found class.
pub fn is_not_found(err: &anyhow::Error) -> bool {
    err.downcast_ref::<StoreError>()
        .is_some_and(StoreError::is_not_found)
}
