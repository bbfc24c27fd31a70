//! Application services for task workflow orchestration.

mod lifecycle;

pub use lifecycle::{
    CreateTaskRequest, PrivilegedAction, TaskLifecycleError, TaskLifecycleResult,
    TaskLifecycleService, TransitionTaskRequest, UpdateTaskRequest,
};
