use axum::{Router, routing::get};

pub fn register() -> Router {
    Router::new()
        .route("/", get(greeting))
        .route("/health", get(health_check))
}

async fn greeting() -> &'static str {
    "hello world"
}

async fn health_check() -> &'static str {
    r#"{"status":"ok"}"#
}
