use crate::auth::CurrentUser;
use crate::task::{Task, TaskData, TaskPatch, TaskService, TaskServiceError, TaskState};
use crate::web::api::v1::ErrorResponse;
use axum::{
    Extension, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// JSON representation of a task in list responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskJson {
    /// Unique identifier for the task
    id: i32,
    /// Description of the task
    descricao: String,
    /// Conclusion timestamp; null while the task is open
    data_conclusao: Option<chrono::DateTime<chrono::Utc>>,
    /// Category the task belongs to
    id_categoria: i32,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            id: task.id(),
            descricao: task.descricao().to_string(),
            data_conclusao: task.data_conclusao(),
            id_categoria: task.id_categoria(),
        }
    }
}

/// JSON representation of a single task in detail responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskDetailJson {
    /// Description of the task
    descricao: String,
    /// Conclusion timestamp; null while the task is open
    data_conclusao: Option<chrono::DateTime<chrono::Utc>>,
    /// Category the task belongs to
    id_categoria: i32,
}

impl From<Task> for TaskDetailJson {
    fn from(task: Task) -> Self {
        Self {
            descricao: task.descricao().to_string(),
            data_conclusao: task.data_conclusao(),
            id_categoria: task.id_categoria(),
        }
    }
}

/// JSON request payload for creating a task.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    /// Description of the task
    descricao: String,
    /// Category the task belongs to
    id_categoria: i32,
}

/// JSON response for a successfully created task.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatedTaskResponse {
    /// Identifier assigned to the new task
    id: i32,
}

/// JSON request payload for partially updating a task.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTaskRequest {
    /// New description, if it should change
    #[serde(default)]
    descricao: Option<String>,
    /// New category, if it should change
    #[serde(default)]
    id_categoria: Option<i32>,
}

/// Query parameters for filtering the task list.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListTasksQuery {
    /// Optional search term; filters by case-sensitive substring of the description
    #[serde(default)]
    termo: Option<String>,
}

/// Error wrapper translating task service errors into JSON API responses.
#[derive(Debug)]
pub struct TaskApiError(TaskServiceError);

impl From<TaskServiceError> for TaskApiError {
    fn from(err: TaskServiceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for TaskApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self.0 {
            TaskServiceError::Validation(message) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION", message)
            }
            TaskServiceError::TaskNotFound(_) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Task not found".to_string(),
            ),
            TaskServiceError::Database(err) => {
                tracing::error!("Task operation failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An unexpected error occurred while processing your request".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

/// Handler for POST /api/v1/tarefas - Creates a task owned by the caller.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/v1/tarefas",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = CreatedTaskResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 422, description = "Invalid task data", body = ErrorResponse)
    ),
    tag = "Tarefas"
)]
pub async fn create_task_handler(
    State(state): State<Arc<TaskState>>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<CreatedTaskResponse>), TaskApiError> {
    let service = TaskService::new(&state.db);
    let id = service
        .create_task(
            &current_user.username,
            TaskData {
                descricao: payload.descricao,
                id_categoria: payload.id_categoria,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedTaskResponse { id })))
}

/// Handler for GET /api/v1/tarefas - Lists the caller's tasks.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/v1/tarefas",
    params(
        ("termo" = Option<String>, Query, description = "Optional search term (case-sensitive substring of the description)")
    ),
    responses(
        (status = 200, description = "Tasks owned by the caller", body = [TaskJson]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "Tarefas"
)]
pub async fn list_tasks_handler(
    State(state): State<Arc<TaskState>>,
    Extension(current_user): Extension<CurrentUser>,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<Vec<TaskJson>>, TaskApiError> {
    let service = TaskService::new(&state.db);
    let tasks = service
        .list_tasks(&current_user.username, query.termo.as_deref())
        .await?;
    Ok(Json(tasks.into_iter().map(TaskJson::from).collect()))
}

/// Handler for GET /api/v1/tarefas/{id} - Returns one of the caller's tasks.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/v1/tarefas/{id}",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "The requested task", body = TaskDetailJson),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Task absent or owned by someone else", body = ErrorResponse)
    ),
    tag = "Tarefas"
)]
pub async fn get_task_handler(
    State(state): State<Arc<TaskState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<TaskDetailJson>, TaskApiError> {
    let service = TaskService::new(&state.db);
    let task = service.get_task(&current_user.username, id).await?;
    Ok(Json(TaskDetailJson::from(task)))
}

/// Handler for PATCH /api/v1/tarefas/{id} - Applies a partial update.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    patch,
    path = "/api/v1/tarefas/{id}",
    params(("id" = i32, Path, description = "Task ID")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 204, description = "Task updated"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Task absent or owned by someone else", body = ErrorResponse),
        (status = 422, description = "Invalid task data", body = ErrorResponse)
    ),
    tag = "Tarefas"
)]
pub async fn update_task_handler(
    State(state): State<Arc<TaskState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<StatusCode, TaskApiError> {
    let service = TaskService::new(&state.db);
    service
        .update_task(
            &current_user.username,
            id,
            TaskPatch {
                descricao: payload.descricao,
                id_categoria: payload.id_categoria,
            },
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /api/v1/tarefas/{id}/concluir - Concludes a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/v1/tarefas/{id}/concluir",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 204, description = "Task concluded (no-op if already concluded)"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Task absent or owned by someone else", body = ErrorResponse)
    ),
    tag = "Tarefas"
)]
pub async fn conclude_task_handler(
    State(state): State<Arc<TaskState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, TaskApiError> {
    let service = TaskService::new(&state.db);
    service.conclude_task(&current_user.username, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /api/v1/tarefas/{id}/reabrir - Reopens a concluded task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/v1/tarefas/{id}/reabrir",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 204, description = "Task reopened (no-op if already open)"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Task absent or owned by someone else", body = ErrorResponse)
    ),
    tag = "Tarefas"
)]
pub async fn reopen_task_handler(
    State(state): State<Arc<TaskState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, TaskApiError> {
    let service = TaskService::new(&state.db);
    service.reopen_task(&current_user.username, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for DELETE /api/v1/tarefas/{id} - Deletes a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/api/v1/tarefas/{id}",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Task absent or owned by someone else", body = ErrorResponse)
    ),
    tag = "Tarefas"
)]
pub async fn delete_task_handler(
    State(state): State<Arc<TaskState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, TaskApiError> {
    let service = TaskService::new(&state.db);
    service.delete_task(&current_user.username, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Creates and returns the tasks API router.
pub fn create_api_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route(
            "/tarefas",
            post(create_task_handler).get(list_tasks_handler),
        )
        .route(
            "/tarefas/{id}",
            get(get_task_handler)
                .patch(update_task_handler)
                .delete(delete_task_handler),
        )
        .route("/tarefas/{id}/concluir", post(conclude_task_handler))
        .route("/tarefas/{id}/reabrir", post(reopen_task_handler))
        .with_state(state)
}
