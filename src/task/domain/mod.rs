//! Domain model for the task workflow.
//!
//! The task domain models task creation, descriptive edits, the status
//! lifecycle with work-time accounting, and the append-only activity trail,
//! keeping all infrastructure concerns outside of the domain boundary.

mod activity;
mod actor;
mod details;
mod error;
mod ids;
pub mod lifecycle;
mod status;
mod task;

pub use activity::{ActivityAction, ActivityHistory, PersistedActivityData, TaskActivity};
pub use actor::{Actor, UserRole};
pub use details::{TaskName, TaskPriority};
pub use error::{
    ParseActivityActionError, ParseTaskPriorityError, ParseTaskStatusError, ParseUserRoleError,
    TaskDomainError,
};
pub use ids::{ActivityId, EpicId, ProjectId, TaskId, UserId};
pub use lifecycle::StatusTransition;
pub use status::TaskStatus;
pub use task::{PersistedTaskData, Stamp, Task, TaskDetailsPatch, TaskDraft};
