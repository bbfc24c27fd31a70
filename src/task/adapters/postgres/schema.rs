//! Diesel schema for task workflow persistence.

diesel::table! {
    /// Task records with lifecycle and work-time columns.
    tasks (id) {
        /// Internal task identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Optional epic.
        epic_id -> Nullable<Uuid>,
        /// Task name.
        #[max_length = 200]
        name -> Varchar,
        /// Free-form description.
        description -> Nullable<Text>,
        /// Priority (`low`, `medium`, `high`).
        #[max_length = 20]
        priority -> Varchar,
        /// Optional deadline.
        deadline -> Nullable<Timestamptz>,
        /// Workflow status.
        #[max_length = 20]
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Creating user.
        created_by -> Uuid,
        /// First start of work.
        started_at -> Nullable<Timestamptz>,
        /// User who started work.
        started_by -> Nullable<Uuid>,
        /// First submission for review.
        reviewed_at -> Nullable<Timestamptz>,
        /// User who submitted for review.
        reviewed_by -> Nullable<Uuid>,
        /// Completion timestamp.
        completed_at -> Nullable<Timestamptz>,
        /// User who completed the task.
        completed_by -> Nullable<Uuid>,
        /// Seconds spent in closed `in_progress` sessions.
        accumulated_work_time -> Int8,
        /// Start of the open `in_progress` session.
        last_progress_start -> Nullable<Timestamptz>,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// Optimistic concurrency version.
        version -> Int8,
    }
}

diesel::table! {
    /// Users assigned to a task, in assignment order.
    task_assignees (task_id, user_id) {
        /// Assigned task.
        task_id -> Uuid,
        /// Assigned user.
        user_id -> Uuid,
        /// Position in the assignee list.
        position -> Int4,
    }
}

diesel::table! {
    /// Append-only audit trail of task events.
    task_activity (activity_id) {
        /// Activity identifier.
        activity_id -> Uuid,
        /// Task the activity belongs to.
        task_id -> Uuid,
        /// Acting user.
        user_id -> Uuid,
        /// `created` or `status_change`.
        #[max_length = 50]
        action_type -> Varchar,
        /// Status before the action.
        #[max_length = 50]
        old_status -> Nullable<Varchar>,
        /// Status after the action.
        #[max_length = 50]
        new_status -> Varchar,
        /// When the action happened.
        timestamp -> Timestamptz,
        /// Insertion order, breaks timestamp ties.
        sequence -> Int8,
    }
}

diesel::joinable!(task_assignees -> tasks (task_id));
diesel::joinable!(task_activity -> tasks (task_id));
diesel::allow_tables_to_appear_in_same_query!(tasks, task_assignees, task_activity);
