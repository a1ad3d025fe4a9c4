use axum::{
    Extension, Router,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use serde_json::json;
use std::env;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::error;

use feastlog::DatabaseService;

static START_TIME: OnceLock<u64> = OnceLock::new();

pub fn register() -> Router {
    START_TIME.get_or_init(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX epoch")
            .as_secs()
    });

    Router::new().route("/metrics", get(get_metrics))
}

async fn get_metrics(Extension(db): Extension<DatabaseService>) -> impl IntoResponse {
    let metrics_enabled = env::var("METRICS_ENABLED")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    if !metrics_enabled {
        return StatusCode::NOT_FOUND.into_response();
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| std::time::Duration::from_secs(0))
        .as_secs();

    let start_time = *START_TIME.get().unwrap_or(&0);
    let uptime = now - start_time;

    let (reviews_total, favorites_total) = match record_counts(&db).await {
        Ok(counts) => counts,
        Err(e) => {
            error!("Failed to count records for metrics: {}", e);
            (0, 0)
        }
    };

    Json(json!({
        "reviews_total": reviews_total,
        "favorites_total": favorites_total,
        "uptime_seconds": uptime,
        "timestamp": chrono::Utc::now().timestamp()
    }))
    .into_response()
}

async fn record_counts(db: &DatabaseService) -> Result<(u64, u64), anyhow::Error> {
    let reviews = db.count_reviews().await?;
    let favorites = db.count_favorites().await?;
    Ok((reviews, favorites))
}
