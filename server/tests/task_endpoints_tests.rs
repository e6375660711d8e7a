use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;
use tarefas_server::auth::{AuthState, encode_jwt};
use tarefas_server::task::TaskState;
use tarefas_server::web::create_app;
use testcontainers_modules::{postgres, testcontainers};
use tower::ServiceExt;

mod common;

const JWT_SECRET: &str = "test_secret";

pub struct TestContext {
    #[allow(dead_code)] // container is kept to ensure it's not dropped
    pub container: testcontainers::ContainerAsync<postgres::Postgres>,
    pub app: axum::Router,
}

async fn setup() -> anyhow::Result<TestContext> {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().try_init();
    let container = common::setup_container().await?;
    let db = common::setup_db(&container).await?;

    let auth_state = Arc::new(AuthState {
        jwt_secret: JWT_SECRET.to_string(),
    });
    let task_state = Arc::new(TaskState { db: Arc::new(db) });
    let app = create_app(auth_state, task_state);

    Ok(TestContext { container, app })
}

async fn token_for(username: &str) -> String {
    encode_jwt(username.to_string(), JWT_SECRET)
        .await
        .expect("Failed to encode token")
}

async fn send(
    app: &axum::Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, json)
}

#[tokio::test]
async fn health_check_is_public() {
    let ctx = setup().await.expect("Failed to setup test context");

    let (status, body) = send(&ctx.app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));
}

#[tokio::test]
async fn rejects_requests_without_a_token() {
    let ctx = setup().await.expect("Failed to setup test context");

    let (status, body) = send(&ctx.app, Method::GET, "/api/v1/tarefas", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "TOKEN_INVALID");
}

#[tokio::test]
async fn rejects_requests_with_an_invalid_token() {
    let ctx = setup().await.expect("Failed to setup test context");

    let (status, _) = send(
        &ctx.app,
        Method::GET,
        "/api/v1/tarefas",
        Some("not-a-real-token"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn full_task_lifecycle_over_http() {
    let ctx = setup().await.expect("Failed to setup test context");
    let token = token_for("pedro").await;

    // Create
    let (status, body) = send(
        &ctx.app,
        Method::POST,
        "/api/v1/tarefas",
        Some(&token),
        Some(json!({"descricao": "Comprar leite", "id_categoria": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().expect("Response should carry the new ID");

    // Get
    let uri = format!("/api/v1/tarefas/{}", id);
    let (status, body) = send(&ctx.app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["descricao"], "Comprar leite");
    assert_eq!(body["id_categoria"], 1);
    assert_eq!(body["data_conclusao"], Value::Null);

    // List with a search term
    let (status, body) = send(
        &ctx.app,
        Method::GET,
        "/api/v1/tarefas?termo=leite",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    // Partial update
    let (status, _) = send(
        &ctx.app,
        Method::PATCH,
        &uri,
        Some(&token),
        Some(json!({"id_categoria": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&ctx.app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(body["descricao"], "Comprar leite");
    assert_eq!(body["id_categoria"], 2);

    // Conclude
    let conclude_uri = format!("/api/v1/tarefas/{}/concluir", id);
    let (status, _) = send(&ctx.app, Method::POST, &conclude_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&ctx.app, Method::GET, &uri, Some(&token), None).await;
    assert!(body["data_conclusao"].is_string());

    // Reopen
    let reopen_uri = format!("/api/v1/tarefas/{}/reabrir", id);
    let (status, _) = send(&ctx.app, Method::POST, &reopen_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&ctx.app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(body["data_conclusao"], Value::Null);

    // Delete
    let (status, _) = send(&ctx.app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&ctx.app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_with_empty_descricao_is_unprocessable() {
    let ctx = setup().await.expect("Failed to setup test context");
    let token = token_for("pedro").await;

    let (status, body) = send(
        &ctx.app,
        Method::POST,
        "/api/v1/tarefas",
        Some(&token),
        Some(json!({"descricao": "", "id_categoria": 1})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "VALIDATION");
}

#[tokio::test]
async fn create_with_unknown_categoria_is_unprocessable() {
    let ctx = setup().await.expect("Failed to setup test context");
    let token = token_for("pedro").await;

    let (status, body) = send(
        &ctx.app,
        Method::POST,
        "/api/v1/tarefas",
        Some(&token),
        Some(json!({"descricao": "Comprar leite", "id_categoria": 9999})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "VALIDATION");
}

#[tokio::test]
async fn foreign_tasks_are_not_found_over_http() {
    let ctx = setup().await.expect("Failed to setup test context");
    let pedro_token = token_for("pedro").await;
    let clara_token = token_for("clara").await;

    let (status, body) = send(
        &ctx.app,
        Method::POST,
        "/api/v1/tarefas",
        Some(&pedro_token),
        Some(json!({"descricao": "Comprar leite", "id_categoria": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().expect("Response should carry the new ID");
    let uri = format!("/api/v1/tarefas/{}", id);

    let (status, body) = send(&ctx.app, Method::GET, &uri, Some(&clara_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");

    let (status, _) = send(&ctx.app, Method::DELETE, &uri, Some(&clara_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Clara sees none of pedro's tasks in her list.
    let (status, body) = send(
        &ctx.app,
        Method::GET,
        "/api/v1/tarefas",
        Some(&clara_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(0));
}
