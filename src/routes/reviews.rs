use axum::{
    Extension, Router,
    extract::{Path, Query},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use mongodb::bson::Document;
use serde::Deserialize;
use serde_json::{Value, json};

use feastlog::DatabaseService;
use feastlog::constants::{RECOMMENDED_LIMIT, TOP_RATED_LIMIT};
use feastlog::utils::{error_response, stringify_id};

use super::{json_records, store_error};

pub fn register() -> Router {
    let public = Router::new()
        .route("/food-reviews", get(list_reviews))
        .route("/search-reviews", get(search_reviews))
        .route("/top-food-reviews", get(top_reviews))
        .route("/recomended-food", get(recommended_food));

    let protected = Router::new()
        .route("/food-reviews", post(create_review))
        .route(
            "/food-reviews/{id}",
            get(review_detail).put(update_review).delete(delete_review),
        )
        .route("/my-food-reviews", get(my_reviews))
        .route_layer(middleware::from_fn(
            crate::middleware::auth::auth_middleware,
        ));

    Router::new().merge(public).merge(protected)
}

#[derive(Deserialize)]
struct SearchQuery {
    search: Option<String>,
}

#[derive(Deserialize)]
struct AuthorQuery {
    email: Option<String>,
}

async fn list_reviews(Extension(db): Extension<DatabaseService>) -> impl IntoResponse {
    match db.list_reviews().await {
        Ok(reviews) => json_records(reviews),
        Err(e) => store_error("list reviews", e),
    }
}

async fn search_reviews(
    Extension(db): Extension<DatabaseService>,
    Query(params): Query<SearchQuery>,
) -> impl IntoResponse {
    let term = params.search.unwrap_or_default();
    match db.search_reviews(&term).await {
        Ok(reviews) => json_records(reviews),
        Err(e) => store_error("search reviews", e),
    }
}

async fn top_reviews(Extension(db): Extension<DatabaseService>) -> impl IntoResponse {
    match db.top_rated_reviews(TOP_RATED_LIMIT).await {
        Ok(reviews) => json_records(reviews),
        Err(e) => store_error("list top-rated reviews", e),
    }
}

async fn recommended_food(Extension(db): Extension<DatabaseService>) -> impl IntoResponse {
    match db.top_rated_reviews(RECOMMENDED_LIMIT).await {
        Ok(reviews) => json_records(reviews),
        Err(e) => store_error("pick recommended review", e),
    }
}

async fn my_reviews(
    Extension(db): Extension<DatabaseService>,
    Query(params): Query<AuthorQuery>,
) -> impl IntoResponse {
    let email = params.email.unwrap_or_default();
    match db.reviews_by_author(&email).await {
        Ok(reviews) => json_records(reviews),
        Err(e) => store_error("list reviews by author", e),
    }
}

async fn review_detail(
    Extension(db): Extension<DatabaseService>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match db.get_review(&id).await {
        Ok(Some(mut review)) => {
            stringify_id(&mut review);
            Json(review).into_response()
        }
        Ok(None) => Json(Value::Null).into_response(),
        Err(e) => store_error("fetch review", e),
    }
}

async fn create_review(
    Extension(db): Extension<DatabaseService>,
    Json(review): Json<Document>,
) -> impl IntoResponse {
    match db.insert_review(review).await {
        Ok(id) => Json(json!({
            "acknowledged": true,
            "insertedId": id.to_hex()
        }))
        .into_response(),
        Err(e) => store_error("create review", e),
    }
}

async fn update_review(
    Extension(db): Extension<DatabaseService>,
    Path(id): Path<String>,
    Json(fields): Json<Document>,
) -> impl IntoResponse {
    match db.update_review(&id, fields).await {
        Ok(result) if result.matched_count == 0 => (
            StatusCode::NOT_FOUND,
            Json(error_response("review not found")),
        )
            .into_response(),
        Ok(result) => Json(json!({
            "acknowledged": true,
            "matchedCount": result.matched_count,
            "modifiedCount": result.modified_count
        }))
        .into_response(),
        Err(e) => store_error("update review", e),
    }
}

async fn delete_review(
    Extension(db): Extension<DatabaseService>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match db.delete_review(&id).await {
        Ok(0) => (
            StatusCode::NOT_FOUND,
            Json(error_response("review not found")),
        )
            .into_response(),
        Ok(deleted) => Json(json!({
            "success": true,
            "deletedCount": deleted
        }))
        .into_response(),
        Err(e) => store_error("delete review", e),
    }
}
