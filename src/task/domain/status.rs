//! Workflow status of a task.

use super::ParseTaskStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task workflow status.
///
/// Every ordered pair of distinct statuses is a permitted transition; the
/// only gate is the completion privilege enforced by the lifecycle engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Work has not started.
    #[default]
    ToDo,
    /// Work is under way and accruing time.
    InProgress,
    /// Work is waiting for a reviewer.
    ForReview,
    /// Work has been accepted.
    Done,
}

impl TaskStatus {
    /// All statuses in workflow order.
    pub const ALL: [Self; 4] = [Self::ToDo, Self::InProgress, Self::ForReview, Self::Done];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ToDo => "to_do",
            Self::InProgress => "in_progress",
            Self::ForReview => "for_review",
            Self::Done => "done",
        }
    }

    /// Returns `true` when entering this status should notify reviewers or
    /// watchers.
    #[must_use]
    pub const fn is_notable(self) -> bool {
        matches!(self, Self::ForReview | Self::Done)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Only the canonical lowercase forms are accepted; there is no trimming
/// or case folding.
impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "to_do" => Ok(Self::ToDo),
            "in_progress" => Ok(Self::InProgress),
            "for_review" => Ok(Self::ForReview),
            "done" => Ok(Self::Done),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}
