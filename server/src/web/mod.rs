use axum::http::header::AUTHORIZATION;
use migration::MigratorTrait;
use sea_orm::Database;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::AuthState;
use crate::config::Config;
use crate::task::TaskState;

pub mod api;

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    let db = Database::connect(&config.db_url).await?;
    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let auth_state = Arc::new(AuthState::from_config(&config));
    let task_state = Arc::new(TaskState { db: Arc::new(db) });

    let app = create_app(auth_state, task_state);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Assembles the full application router: the JSON API, the public health
/// check and the Swagger UI, wrapped in tracing and CORS layers.
pub fn create_app(auth_state: Arc<AuthState>, task_state: Arc<TaskState>) -> axum::Router {
    axum::Router::new()
        .merge(api::create_api_router(auth_state, task_state))
        .route("/health", axum::routing::get(health_check_handler))
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api::ApiDoc::openapi()),
        )
        .layer(
            ServiceBuilder::new()
                // Keep bearer tokens out of request traces.
                .layer(SetSensitiveRequestHeadersLayer::new(std::iter::once(
                    AUTHORIZATION,
                )))
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}
