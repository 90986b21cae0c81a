use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A task entity as stored in the database and returned by the API.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// Identifier of the user who owns the task. Every read and write is
    /// filtered on this column.
    pub user_id: Uuid,
    /// The title of the task, stored trimmed and never blank.
    pub title: String,
    /// An optional free-form description.
    pub description: Option<String>,
    /// Whether the task has been completed.
    pub is_completed: bool,
    /// Timestamp of when the task was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update to the task.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new `Task` from a [`TaskCreate`] payload and the owner's id.
    /// The title is trimmed; blank titles are rejected before this point.
    pub fn new(input: TaskCreate, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: input.title.trim().to_string(),
            description: input.description,
            is_completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input payload for creating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskCreate {
    /// The title of the task. Must be between 1 and 200 characters;
    /// whitespace-only titles are additionally rejected in the handler.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Optional description, at most 1000 characters.
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

/// Input payload for a partial task update. Absent fields are left untouched.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskUpdate {
    #[validate(length(max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub is_completed: Option<bool>,
}

/// Pagination parameters for listing tasks.
#[derive(Debug, Deserialize, Validate)]
pub struct PageQuery {
    /// 1-based page number.
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: i64,

    /// Number of items per page, capped at 100.
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100))]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    20
}

/// One page of tasks plus pagination metadata.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub items: Vec<Task>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl TaskListResponse {
    pub fn new(items: Vec<Task>, total: i64, page: i64, page_size: i64) -> Self {
        let total_pages = if total > 0 {
            (total + page_size - 1) / page_size
        } else {
            1
        };
        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
        }
    }
}
