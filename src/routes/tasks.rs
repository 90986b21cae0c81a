use crate::{
    auth::AuthenticatedIdentity,
    error::AppError,
    models::{PageQuery, Task, TaskCreate, TaskListResponse, TaskUpdate},
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const TASK_COLUMNS: &str =
    "id, user_id, title, description, is_completed, created_at, updated_at";

/// Fetches a task by id, scoped to its owner.
///
/// The ownership filter lives in the SQL itself, so a task owned by someone
/// else comes back as `None` exactly like a task that does not exist. Both
/// cases surface as `NotFound`; a caller can never distinguish them.
async fn fetch_owned_task(
    pool: &PgPool,
    task_id: Uuid,
    user_id: Uuid,
) -> Result<Task, AppError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2",
        TASK_COLUMNS
    ))
    .bind(task_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    task.ok_or_else(|| AppError::NotFound("Task".into()))
}

/// Creates a new task owned by the authenticated user.
///
/// ## Responses:
/// - `201 Created`: the new `Task` as JSON.
/// - `401 Unauthorized`: missing or invalid token.
/// - `422 Unprocessable Entity`: empty or over-long title/description.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    task_data: web::Json<TaskCreate>,
    identity: AuthenticatedIdentity,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    if task_data.title.trim().is_empty() {
        return Err(AppError::Validation(
            "Title is required and cannot be empty".into(),
        ));
    }

    let task = Task::new(task_data.into_inner(), identity.0.user_id);

    let result = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (id, user_id, title, description, is_completed, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(task.id)
    .bind(task.user_id)
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.is_completed)
    .bind(task.created_at)
    .bind(task.updated_at)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(result))
}

/// Lists the authenticated user's tasks, newest first, with pagination.
///
/// ## Query Parameters:
/// - `page` (optional, default 1): 1-based page number.
/// - `page_size` (optional, default 20, max 100): items per page.
///
/// ## Responses:
/// - `200 OK`: a `TaskListResponse` with items and pagination metadata.
/// - `401 Unauthorized`: missing or invalid token.
/// - `422 Unprocessable Entity`: out-of-range pagination parameters.
#[get("")]
pub async fn list_tasks(
    pool: web::Data<PgPool>,
    page_query: web::Query<PageQuery>,
    identity: AuthenticatedIdentity,
) -> Result<impl Responder, AppError> {
    page_query.validate()?;
    let user_id = identity.0.user_id;
    let offset = (page_query.page - 1) * page_query.page_size;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&**pool)
        .await?;

    let items = sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE user_id = $1
         ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        TASK_COLUMNS
    ))
    .bind(user_id)
    .bind(page_query.page_size)
    .bind(offset)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(TaskListResponse::new(
        items,
        total,
        page_query.page,
        page_query.page_size,
    )))
}

/// Retrieves a single task by id.
///
/// ## Responses:
/// - `200 OK`: the `Task` as JSON.
/// - `401 Unauthorized`: missing or invalid token.
/// - `404 Not Found`: the task does not exist, or belongs to another user.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    identity: AuthenticatedIdentity,
) -> Result<impl Responder, AppError> {
    let task = fetch_owned_task(&pool, task_id.into_inner(), identity.0.user_id).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Partially updates a task. Absent fields are left untouched; `updated_at`
/// is bumped on every successful update.
///
/// ## Responses:
/// - `200 OK`: the updated `Task` as JSON.
/// - `401 Unauthorized`: missing or invalid token.
/// - `404 Not Found`: the task does not exist, or belongs to another user.
/// - `422 Unprocessable Entity`: empty title or over-long fields.
#[patch("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskUpdate>,
    identity: AuthenticatedIdentity,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let user_id = identity.0.user_id;

    let mut task = fetch_owned_task(&pool, task_id.into_inner(), user_id).await?;

    if let Some(title) = &task_data.title {
        if title.trim().is_empty() {
            return Err(AppError::Validation("Title cannot be empty".into()));
        }
        task.title = title.trim().to_string();
    }
    if let Some(description) = &task_data.description {
        task.description = Some(description.clone());
    }
    if let Some(is_completed) = task_data.is_completed {
        task.is_completed = is_completed;
    }
    task.updated_at = Utc::now();

    let result = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks
         SET title = $1, description = $2, is_completed = $3, updated_at = $4
         WHERE id = $5 AND user_id = $6
         RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.is_completed)
    .bind(task.updated_at)
    .bind(task.id)
    .bind(user_id)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(result))
}

/// Deletes a task.
///
/// ## Responses:
/// - `204 No Content`: on successful deletion.
/// - `401 Unauthorized`: missing or invalid token.
/// - `404 Not Found`: the task does not exist, or belongs to another user.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    identity: AuthenticatedIdentity,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
        .bind(task_id.into_inner())
        .bind(identity.0.user_id)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Task".into()));
    }

    Ok(HttpResponse::NoContent().finish())
}
