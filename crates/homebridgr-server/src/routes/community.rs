//! Community post routes: create, list, analyze (with per-call options).

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Map, Value};

use crate::routes::analyze::{
    analyze_post, failure, non_blank_field, parse_body, sanitize_options, COMMUNITY_POSTS,
};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/community/post", get(list_posts).post(create_post))
        .route("/community/post/analyze", post(analyze))
}

async fn list_posts(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    match state.store.list(COMMUNITY_POSTS.collection) {
        Ok(posts) => (StatusCode::OK, Json(json!({ "posts": posts }))),
        Err(err) => failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to fetch community posts",
            Some(err.to_string()),
        ),
    }
}

fn resolve_content_type(
    provided: Option<String>,
    has_text: bool,
    has_link: bool,
    has_image: bool,
) -> String {
    if let Some(content_type) = provided {
        return content_type;
    }
    if has_text {
        "text".into()
    } else if has_link {
        "link".into()
    } else if has_image {
        "image".into()
    } else {
        "unknown".into()
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

    let Some(community_id) = non_blank_field(&payload, "communityId") else {
        return failure(
            StatusCode::BAD_REQUEST,
            "`communityId` is required and must be a non-empty string.",
            None,
        );
    };

    let Some(author_id) = non_blank_field(&payload, "authorId") else {
        return failure(
            StatusCode::BAD_REQUEST,
            "`authorId` is required and must be a non-empty string.",
            None,
        );
    };

    let text = non_blank_field(&payload, "text");
    let link_url = non_blank_field(&payload, "linkUrl");
    let image_url = non_blank_field(&payload, "imageUrl");

    if text.is_none() && link_url.is_none() && image_url.is_none() {
        return failure(
            StatusCode::BAD_REQUEST,
            "Provide at least one of `text`, `linkUrl`, or `imageUrl`.",
            None,
        );
    }

    let content_type = resolve_content_type(
        non_blank_field(&payload, "contentType"),
        text.is_some(),
        link_url.is_some(),
        image_url.is_some(),
    );

    let mut fields = Map::new();
    fields.insert("community_id".into(), json!(community_id));
    fields.insert("author_id".into(), json!(author_id));
    fields.insert("content_type".into(), json!(content_type));
    if let Some(text) = text {
        fields.insert("text_content".into(), json!(text));
    }
    if let Some(url) = link_url {
        fields.insert("link_url".into(), json!(url));
    }
    if let Some(url) = image_url {
        fields.insert("image_url".into(), json!(url));
    }

    match state.store.insert(COMMUNITY_POSTS.collection, fields) {
        Ok(post) => (StatusCode::CREATED, Json(json!({ "post": post }))),
        Err(err) => failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to create community post",
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

    let options = sanitize_options(payload.get("options"));

    match analyze_post(&state, &COMMUNITY_POSTS, &post_id, options.as_ref()).await {
        Ok((post, analysis)) => (
            StatusCode::OK,
            Json(json!({ "post": post, "analysis": analysis })),
        ),
        Err(response) => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_resolution_order() {
        assert_eq!(
            resolve_content_type(Some("poll".into()), true, true, true),
            "poll"
        );
        assert_eq!(resolve_content_type(None, true, true, true), "text");
        assert_eq!(resolve_content_type(None, false, true, true), "link");
        assert_eq!(resolve_content_type(None, false, false, true), "image");
        assert_eq!(resolve_content_type(None, false, false, false), "unknown");
    }
}
