use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Extension, Json, Router,
};
use blog_firebase::Session;
use blog_types::{Post, PostDraft};

use crate::error::{error_response, ApiError};
use crate::middleware::auth::{require_session, AppState};

pub fn routes(state: AppState) -> Router<AppState> {
    let writeRoutes = Router::new()
        .route("/api/v1/posts", axum::routing::post(create_post))
        .route("/api/v1/posts/:id", delete(delete_post))
        .route_layer(middleware::from_fn_with_state(state, require_session));

    Router::new()
        .route("/api/v1/posts", get(list_posts))
        .route("/api/v1/posts/:id", get(get_post))
        .merge(writeRoutes)
}

async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(state.services.db.list_posts().await?))
}

async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    match state.services.db.get_post(&id).await? {
        Some(post) => Ok(Json(post).into_response()),
        None => Ok(error_response(StatusCode::NOT_FOUND, "post not found")),
    }
}

async fn create_post(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(draft): Json<PostDraft>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let post = state.services.db.create_post(&draft, &session).await?;
    tracing::info!("{} published post {}", session.user.uid, post.id);
    Ok((StatusCode::CREATED, Json(post)))
}

async fn delete_post(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.services.db.delete_post(&id, &session).await?;
    tracing::info!("{} deleted post {id}", session.user.uid);
    Ok(StatusCode::NO_CONTENT)
}
