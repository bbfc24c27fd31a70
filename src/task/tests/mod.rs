//! Unit tests for the task workflow module.


use crate::task::domain::{Actor, ProjectId, Task, TaskDraft, TaskName, UserId, UserRole};
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use std::sync::Mutex;

/// Returns the UTC instant `seconds` after the Unix epoch.
pub(super) fn at(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .expect("test timestamps are in range")
}

pub(super) fn member() -> Actor {
    Actor::new(UserId::new(), UserRole::User)
}

pub(super) fn manager() -> Actor {
    Actor::new(UserId::new(), UserRole::Manager)
}

/// A fresh `to_do` task created by `creator` at `created_at`.
pub(super) fn new_task(creator: &Actor, created_at: DateTime<Utc>) -> Task {
    let name = TaskName::new("Implement login form").expect("valid task name");
    Task::new(
        TaskDraft::new(ProjectId::new(), name),
        creator.user_id(),
        created_at,
    )
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub(super) struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub(super) const fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub(super) fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().expect("clock lock") = now;
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}
