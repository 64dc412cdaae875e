//! Student post routes: create, list, analyze.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Map, Value};

use crate::routes::analyze::{
    analyze_post, failure, non_blank_field, parse_body, STUDENT_POSTS,
};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/analyze", post(analyze))
}

async fn list_posts(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    match state.store.list(STUDENT_POSTS.collection) {
        Ok(posts) => (StatusCode::OK, Json(json!({ "posts": posts }))),
        Err(err) => failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to fetch posts",
            Some(err.to_string()),
        ),
    }
}

async fn create_post(
    State(state): State<Arc<AppState>>,
    body: String,
) -> (StatusCode, Json<Value>) {
    let payload = match parse_body(&body) {
        Ok(payload) => payload,
        Err(response) => return response,
    };

    let Some(caption) = non_blank_field(&payload, "caption") else {
        return failure(
            StatusCode::BAD_REQUEST,
            "`caption` is required and must be a non-empty string.",
            None,
        );
    };

    let Some(author_id) = non_blank_field(&payload, "author_id") else {
        return failure(
            StatusCode::BAD_REQUEST,
            "`author_id` is required and must be a non-empty string.",
            None,
        );
    };

    let image_url = match payload.get("image_url") {
        None | Some(Value::Null) => None,
        Some(Value::String(url)) => Some(url.clone()),
        Some(_) => {
            return failure(
                StatusCode::BAD_REQUEST,
                "`image_url` must be a string when provided.",
                None,
            );
        }
    };

    let mut fields = Map::new();
    fields.insert("caption".into(), json!(caption));
    fields.insert("author_id".into(), json!(author_id));
    if let Some(url) = image_url {
        fields.insert("image_url".into(), json!(url));
    }

    match state.store.insert(STUDENT_POSTS.collection, fields) {
        Ok(post) => (StatusCode::CREATED, Json(json!({ "post": post }))),
        Err(err) => failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to create post",
            Some(err.to_string()),
        ),
    }
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    body: String,
) -> (StatusCode, Json<Value>) {
    let payload = match parse_body(&body) {
        Ok(payload) => payload,
        Err(response) => return response,
    };

    let Some(post_id) = non_blank_field(&payload, "postId") else {
        return failure(
            StatusCode::BAD_REQUEST,
            "`postId` is required and must be a non-empty string.",
            None,
        );
    };

    match analyze_post(&state, &STUDENT_POSTS, &post_id, None).await {
        Ok((post, analysis)) => (
            StatusCode::OK,
            Json(json!({ "post": post, "analysis": analysis })),
        ),
        Err(response) => response,
    }
}
