//! Task records and their status.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::TaskId;

/// Task status.
///
/// State transitions:
/// - Pending -> Success (batch committed)
/// - Failed stays takeable; a later `take` may hand it out again
///
/// The driver itself only ever writes `Success`. `Failed` is set by stores
/// or operators that want a task retried in a later run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Failed,
    Success,
}

impl TaskStatus {
    /// Eligible for `TaskStore::take`?
    pub fn is_takeable(self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Failed => "FAILED",
            TaskStatus::Success => "SUCCESS",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of migration work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task<T> {
    pub id: TaskId,
    pub payload: T,
    pub status: TaskStatus,
}

impl<T> Task<T> {
    /// A freshly added task (always `Pending`).
    pub fn pending(id: impl Into<TaskId>, payload: T) -> Self {
        Self {
            id: id.into(),
            payload,
            status: TaskStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TaskStatus::Pending, true)]
    #[case(TaskStatus::Failed, true)]
    #[case(TaskStatus::Success, false)]
    fn takeable_statuses(#[case] status: TaskStatus, #[case] expected: bool) {
        assert_eq!(status.is_takeable(), expected);
    }

    #[test]
    fn status_uses_upper_case_wire_names() {
        let json = serde_json::to_string(&TaskStatus::Success).unwrap();
        assert_eq!(json, "\"SUCCESS\"");
        assert_eq!(TaskStatus::Failed.to_string(), "FAILED");
    }
}
