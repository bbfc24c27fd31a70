//! Shared world state for task status workflow BDD scenarios.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::fixture;
use trackboard::task::{
    adapters::memory::{InMemoryTaskRepository, RecordingNotifier},
    domain::{Actor, Task, UserId, UserRole},
    services::{TaskLifecycleError, TaskLifecycleService},
};

/// Clock advanced explicitly by scenario steps.
#[derive(Debug)]
pub struct ScenarioClock {
    now: Mutex<DateTime<Utc>>,
}

impl ScenarioClock {
    fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock forward by `seconds`.
    pub fn advance(&self, seconds: i64) {
        let mut now = self.now.lock().expect("scenario clock lock");
        *now += Duration::seconds(seconds);
    }
}

impl Clock for ScenarioClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("scenario clock lock")
    }
}

/// Service type used by the BDD world.
pub type TestTaskService = TaskLifecycleService<InMemoryTaskRepository, ScenarioClock>;

/// Scenario world for task status workflow behaviour tests.
pub struct TaskWorkflowWorld {
    pub service: TestTaskService,
    pub clock: Arc<ScenarioClock>,
    pub notifier: RecordingNotifier,
    pub manager: Actor,
    pub member: Actor,
    pub task: Option<Task>,
    pub last_transition_result: Option<Result<Task, TaskLifecycleError>>,
}

impl TaskWorkflowWorld {
    /// Creates a world with a fresh repository and a clock at a fixed instant.
    #[must_use]
    pub fn new() -> Self {
        let start = Utc
            .with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
            .single()
            .expect("valid scenario start");
        let clock = Arc::new(ScenarioClock::starting_at(start));
        let notifier = RecordingNotifier::new();
        let service = TaskLifecycleService::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::clone(&clock),
        )
        .with_notifier(Arc::new(notifier.clone()));

        Self {
            service,
            clock,
            notifier,
            manager: Actor::new(UserId::new(), UserRole::Manager),
            member: Actor::new(UserId::new(), UserRole::User),
            task: None,
            last_transition_result: None,
        }
    }

    /// Resolves a role word used in step text to the matching actor.
    ///
    /// # Errors
    ///
    /// Returns an error for role words the scenarios do not define.
    pub fn actor(&self, role: &str) -> Result<Actor, eyre::Report> {
        match role {
            "manager" => Ok(self.manager),
            "member" => Ok(self.member),
            other => Err(eyre::eyre!("unknown scenario role: {other}")),
        }
    }

    /// Returns the task under test.
    ///
    /// # Errors
    ///
    /// Returns an error when no task was created by an earlier step.
    pub fn task(&self) -> Result<&Task, eyre::Report> {
        self.task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing created task in scenario world"))
    }
}

impl Default for TaskWorkflowWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskWorkflowWorld {
    TaskWorkflowWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
