use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use common::types::PageQuery;
use service::feeds::GroupFeed;
use service::pagination::Page;
use service::views::PostView;

use crate::errors::JsonApiError;
use crate::extract::CurrentUser;
use crate::routes::ServerState;

/// Home feed; the body comes straight from the feed cache.
pub async fn index(State(state): State<ServerState>, Query(q): Query<PageQuery>) -> Result<impl IntoResponse, JsonApiError> {
    let body = state.blog.home_feed_json(q.page.as_deref()).await?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}

pub async fn group_posts(
    State(state): State<ServerState>,
    Path(slug): Path<String>,
    Query(q): Query<PageQuery>,
) -> Result<Json<GroupFeed>, JsonApiError> {
    Ok(Json(state.blog.group_feed(&slug, q.page.as_deref()).await?))
}

/// Posts by the authors the acting user follows.
pub async fn follow_index(
    State(state): State<ServerState>,
    CurrentUser(me): CurrentUser,
    Query(q): Query<PageQuery>,
) -> Result<Json<Page<PostView>>, JsonApiError> {
    Ok(Json(state.blog.follow_feed(me.id, q.page.as_deref()).await?))
}
