use axum::{
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::{observability, BlogService};

use crate::errors::JsonApiError;

pub mod feeds;
pub mod posts;
pub mod profile;
pub mod users;

#[derive(Clone)]
pub struct ServerState {
    pub blog: BlogService,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn metrics() -> Result<impl IntoResponse, JsonApiError> {
    let body = observability::encode_metrics().map_err(|e| {
        JsonApiError::new(axum::http::StatusCode::INTERNAL_SERVER_ERROR, "internal", e.to_string())
    })?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}

/// Build the application router: feeds, post and follow operations, sign-up,
/// uploaded media under `/media`.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let media = ServeDir::new(state.blog.media().root());
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/", get(feeds::index))
        .route("/group/:slug/", get(feeds::group_posts))
        .route("/profile/:username/", get(profile::profile))
        .route("/posts/:post_id/", get(posts::post_detail))
        .route("/auth/signup/", post(users::signup))
        .nest_service("/media", media);

    let acting = Router::new()
        .route("/create/", post(posts::post_create))
        .route("/posts/:post_id/edit/", post(posts::post_edit))
        .route("/posts/:post_id/comment/", post(posts::add_comment))
        .route("/follow/", get(feeds::follow_index))
        .route("/profile/:username/follow/", post(profile::profile_follow))
        .route("/profile/:username/unfollow/", post(profile::profile_unfollow));

    public
        .merge(acting)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
