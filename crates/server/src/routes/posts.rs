use axum::{
    extract::{multipart::{MultipartError, MultipartRejection}, Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use service::media::ImageUpload;
use service::posts::{CommentForm, PostDetail, PostForm};
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::extract::{CurrentUser, PostId};
use crate::routes::ServerState;

/// Result of a write: the new or changed record and where to look at it next.
#[derive(Debug, Serialize)]
pub struct WriteOutput {
    pub id: Uuid,
    pub redirect: String,
}

fn written(status: StatusCode, id: Uuid, redirect: String) -> impl IntoResponse {
    (status, [(header::LOCATION, redirect.clone())], Json(WriteOutput { id, redirect }))
}

fn bad_form(detail: String) -> JsonApiError {
    JsonApiError::new(StatusCode::BAD_REQUEST, "validation", detail)
}

fn multipart_error(e: MultipartError) -> JsonApiError {
    bad_form(e.body_text())
}

/// Read a post form sent as `multipart/form-data` with the fields `text`,
/// `group` (a group id, may be blank) and `image` (a file, may be empty).
async fn read_post_form(multipart: Result<Multipart, MultipartRejection>) -> Result<PostForm, JsonApiError> {
    let mut multipart = multipart.map_err(|e| bad_form(e.body_text()))?;
    let mut form = PostForm::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "text" => form.text = field.text().await.map_err(multipart_error)?,
            "group" => {
                let raw = field.text().await.map_err(multipart_error)?;
                let raw = raw.trim();
                if !raw.is_empty() {
                    let id = raw.parse::<Uuid>().map_err(|_| bad_form(format!("unknown group {raw:?}")))?;
                    form.group = Some(id);
                }
            }
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                // an empty file part means no file was chosen
                if !(bytes.is_empty() && file_name.is_empty()) {
                    form.image = Some(ImageUpload::new(file_name, bytes.to_vec()));
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

pub async fn post_detail(State(state): State<ServerState>, PostId(post_id): PostId) -> Result<Json<PostDetail>, JsonApiError> {
    Ok(Json(state.blog.post_detail(post_id).await?))
}

pub async fn post_create(
    State(state): State<ServerState>,
    CurrentUser(me): CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, JsonApiError> {
    let form = read_post_form(multipart).await?;
    let created = state.blog.create_post(&me, form).await?;
    Ok(written(StatusCode::CREATED, created.id, format!("/profile/{}/", me.username)))
}

pub async fn post_edit(
    State(state): State<ServerState>,
    CurrentUser(me): CurrentUser,
    PostId(post_id): PostId,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, JsonApiError> {
    let form = read_post_form(multipart).await?;
    let updated = state.blog.edit_post(&me, post_id, form).await?;
    Ok(written(StatusCode::OK, updated.id, format!("/posts/{}/", updated.id)))
}

pub async fn add_comment(
    State(state): State<ServerState>,
    CurrentUser(me): CurrentUser,
    PostId(post_id): PostId,
    Json(form): Json<CommentForm>,
) -> Result<impl IntoResponse, JsonApiError> {
    let created = state.blog.add_comment(&me, post_id, form).await?;
    Ok(written(StatusCode::CREATED, created.id, format!("/posts/{post_id}/")))
}
