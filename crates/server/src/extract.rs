//! Request extractors: the acting user and post ids.
//!
//! Authentication happens in front of this service; the authenticated
//! username arrives in the `X-Username` header.

use axum::async_trait;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use axum::http::StatusCode;
use models::user;
use service::errors::ServiceError;
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::routes::ServerState;

pub const USER_HEADER: &str = "x-username";

/// The acting user if the header names a known user.
pub struct MaybeUser(pub Option<user::Model>);

/// The acting user; rejects with 401 otherwise.
pub struct CurrentUser(pub user::Model);

#[async_trait]
impl FromRequestParts<ServerState> for MaybeUser {
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts.headers.get(USER_HEADER) else {
            return Ok(MaybeUser(None));
        };
        let username = raw
            .to_str()
            .map_err(|_| JsonApiError::unauthorized("malformed X-Username header"))?
            .trim();
        if username.is_empty() {
            return Ok(MaybeUser(None));
        }
        match state.blog.user_by_username(username).await {
            Ok(u) => Ok(MaybeUser(Some(u))),
            Err(ServiceError::NotFound(_)) => Ok(MaybeUser(None)),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        match MaybeUser::from_request_parts(parts, state).await? {
            MaybeUser(Some(u)) => Ok(CurrentUser(u)),
            MaybeUser(None) => Err(JsonApiError::unauthorized("authentication required")),
        }
    }
}

/// Post id from the path; anything that is not a post id is a 404.
pub struct PostId(pub Uuid);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for PostId {
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<Uuid>::from_request_parts(parts, state)
            .await
            .map_err(|_| JsonApiError::new(StatusCode::NOT_FOUND, "not_found", "post not found"))?;
        Ok(PostId(id))
    }
}
