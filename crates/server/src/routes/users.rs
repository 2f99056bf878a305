use axum::{extract::State, http::StatusCode, Json};
use service::users::SignupForm;
use service::views::AuthorView;

use crate::errors::JsonApiError;
use crate::routes::ServerState;

pub async fn signup(State(state): State<ServerState>, Json(form): Json<SignupForm>) -> Result<(StatusCode, Json<AuthorView>), JsonApiError> {
    let created = state.blog.signup(form).await?;
    Ok((StatusCode::CREATED, Json(AuthorView::from(&created))))
}
