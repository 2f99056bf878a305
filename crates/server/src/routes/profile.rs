use axum::{
    extract::{Path, Query, State},
    Json,
};
use common::types::PageQuery;
use serde::Serialize;
use service::feeds::ProfileFeed;

use crate::errors::JsonApiError;
use crate::extract::{CurrentUser, MaybeUser};
use crate::routes::ServerState;

#[derive(Debug, Serialize)]
pub struct FollowOutput {
    pub following: bool,
    pub changed: bool,
    pub redirect: String,
}

pub async fn profile(
    State(state): State<ServerState>,
    Path(username): Path<String>,
    MaybeUser(viewer): MaybeUser,
    Query(q): Query<PageQuery>,
) -> Result<Json<ProfileFeed>, JsonApiError> {
    let feed = state.blog.profile_feed(&username, q.page.as_deref(), viewer.as_ref()).await?;
    Ok(Json(feed))
}

pub async fn profile_follow(
    State(state): State<ServerState>,
    CurrentUser(me): CurrentUser,
    Path(username): Path<String>,
) -> Result<Json<FollowOutput>, JsonApiError> {
    let changed = state.blog.follow(&me, &username).await?;
    Ok(Json(FollowOutput {
        following: me.username != username,
        changed,
        redirect: format!("/profile/{username}/"),
    }))
}

pub async fn profile_unfollow(
    State(state): State<ServerState>,
    CurrentUser(me): CurrentUser,
    Path(username): Path<String>,
) -> Result<Json<FollowOutput>, JsonApiError> {
    let changed = state.blog.unfollow(&me, &username).await?;
    Ok(Json(FollowOutput { following: false, changed, redirect: format!("/profile/{username}/") }))
}
