use axum::{
    Extension, Router,
    extract::{Path, Query},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
};
use mongodb::bson::Document;
use serde::Deserialize;
use serde_json::json;

use feastlog::DatabaseService;
use feastlog::utils::error_response;

use super::{json_records, store_error};

pub fn register() -> Router {
    let public = Router::new().route("/favorite-reviews", get(list_favorites));

    let protected = Router::new()
        .route("/favorite-reviews", post(create_favorite))
        .route("/favorite-reviews/{id}", delete(delete_favorite))
        .route("/my-favorite-reviews", get(my_favorites))
        .route_layer(middleware::from_fn(
            crate::middleware::auth::auth_middleware,
        ));

    Router::new().merge(public).merge(protected)
}

#[derive(Deserialize)]
struct OwnerQuery {
    email: Option<String>,
}

async fn list_favorites(Extension(db): Extension<DatabaseService>) -> impl IntoResponse {
    match db.list_favorites().await {
        Ok(favorites) => json_records(favorites),
        Err(e) => store_error("list favorites", e),
    }
}

async fn my_favorites(
    Extension(db): Extension<DatabaseService>,
    Query(params): Query<OwnerQuery>,
) -> impl IntoResponse {
    let email = params.email.unwrap_or_default();
    match db.favorites_liked_by(&email).await {
        Ok(favorites) => json_records(favorites),
        Err(e) => store_error("list favorites by owner", e),
    }
}

async fn create_favorite(
    Extension(db): Extension<DatabaseService>,
    Json(favorite): Json<Document>,
) -> impl IntoResponse {
    match db.insert_favorite(favorite).await {
        Ok(id) => Json(json!({
            "acknowledged": true,
            "insertedId": id.to_hex()
        }))
        .into_response(),
        Err(e) => store_error("create favorite", e),
    }
}

async fn delete_favorite(
    Extension(db): Extension<DatabaseService>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match db.delete_favorite(&id).await {
        Ok(0) => (
            StatusCode::NOT_FOUND,
            Json(error_response("favorite not found")),
        )
            .into_response(),
        Ok(deleted) => Json(json!({
            "success": true,
            "deletedCount": deleted
        }))
        .into_response(),
        Err(e) => store_error("delete favorite", e),
    }
}
