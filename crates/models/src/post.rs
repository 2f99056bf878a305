use sea_orm::{entity::prelude::*, Set, DatabaseConnection, QueryOrder};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::{self, check_len};
use crate::{group, user};

/// Characters of the text used as the post's display name.
pub const PREVIEW_CHARS: usize = 15;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    pub pub_date: DateTimeWithTimeZone,
    pub author_id: Uuid,
    pub group_id: Option<Uuid>,
    pub image: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Author,
    Group,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Author => Entity::belongs_to(user::Entity)
                .from(Column::AuthorId)
                .to(user::Column::Id)
                .into(),
            Relation::Group => Entity::belongs_to(group::Entity)
                .from(Column::GroupId)
                .to(group::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::Author.def() }
}

impl Related<group::Entity> for Entity {
    fn to() -> RelationDef { Relation::Group.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn preview(&self) -> String {
        self.text.chars().take(PREVIEW_CHARS).collect()
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.preview())
    }
}

/// All posts, newest first; ties broken by id so pages stay stable.
pub fn newest_first() -> Select<Entity> {
    Entity::find()
        .order_by_desc(Column::PubDate)
        .order_by_asc(Column::Id)
}

pub fn validate_text(text: &str) -> Result<(), errors::ModelError> {
    check_len("text", text, 3000)
}

/// Images are stored under `posts/` relative to the media root.
pub fn validate_image(image: &str) -> Result<(), errors::ModelError> {
    let name = image.strip_prefix("posts/").unwrap_or("");
    if name.is_empty() || name.contains("..") || name.contains('/') {
        return Err(errors::ModelError::Validation("image must be a file name under posts/".into()));
    }
    let ext = name.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase()).unwrap_or_default();
    if !["gif", "jpg", "jpeg", "png", "webp"].contains(&ext.as_str()) {
        return Err(errors::ModelError::Validation("unsupported image type".into()));
    }
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    author_id: Uuid,
    text: &str,
    group_id: Option<Uuid>,
    image: Option<&str>,
) -> Result<Model, errors::ModelError> {
    validate_text(text)?;
    if let Some(i) = image { validate_image(i)?; }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        text: Set(text.to_string()),
        pub_date: Set(Utc::now().into()),
        author_id: Set(author_id),
        group_id: Set(group_id),
        image: Set(image.map(str::to_string)),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Replace the editable fields; the author and publication date never change.
pub async fn update(
    db: &DatabaseConnection,
    id: Uuid,
    text: &str,
    group_id: Option<Uuid>,
    image: Option<&str>,
) -> Result<Model, errors::ModelError> {
    validate_text(text)?;
    if let Some(i) = image { validate_image(i)?; }
    let mut found: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?
        .ok_or_else(|| errors::ModelError::NotFound("post not found".into()))?
        .into();
    found.text = Set(text.to_string());
    found.group_id = Set(group_id);
    if let Some(i) = image { found.image = Set(Some(i.to_string())); }
    found.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
