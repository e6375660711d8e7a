use std::sync::Arc;

use crate::{
    auth::{self, AuthState},
    task::TaskState,
};

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
};

use tower::ServiceBuilder;
use utoipa::OpenApi;

pub mod v1 {
    use serde::{Deserialize, Serialize};
    use utoipa::ToSchema;

    /// JSON response shape for API errors.
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct ErrorResponse {
        /// Machine-readable error code
        pub error: String,
        /// Human-readable description of the failure
        pub message: String,
    }
}

/// OpenAPI document for the JSON API.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::task::api::v1::create_task_handler,
        crate::task::api::v1::list_tasks_handler,
        crate::task::api::v1::get_task_handler,
        crate::task::api::v1::update_task_handler,
        crate::task::api::v1::conclude_task_handler,
        crate::task::api::v1::reopen_task_handler,
        crate::task::api::v1::delete_task_handler,
    ),
    components(schemas(
        crate::task::api::v1::TaskJson,
        crate::task::api::v1::TaskDetailJson,
        crate::task::api::v1::CreateTaskRequest,
        crate::task::api::v1::CreatedTaskResponse,
        crate::task::api::v1::UpdateTaskRequest,
        v1::ErrorResponse,
    )),
    tags(
        (name = "Tarefas", description = "Task lifecycle operations scoped to the authenticated user")
    )
)]
pub struct ApiDoc;

/// Creates the API routes for JSON API endpoints.
/// Every task route requires a resolved identity; the owner passed to the
/// task service is always the authenticated user.
pub fn create_api_router(auth_state: Arc<AuthState>, task_state: Arc<TaskState>) -> axum::Router {
    let tasks_router = crate::task::api::v1::create_api_router(task_state);
    let protected_routes = tasks_router
        .layer(ServiceBuilder::new().layer(from_fn(auth::api::v1::require_auth_middleware)));
    Router::new()
        .nest("/api/v1", protected_routes)
        .layer(ServiceBuilder::new().layer(from_fn_with_state(
            auth_state,
            auth::api::v1::auth_user_middleware,
        )))
}
