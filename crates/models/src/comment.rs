use sea_orm::{entity::prelude::*, Set, DatabaseConnection, QueryFilter, QueryOrder};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::{self, check_len};
use crate::{post, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    pub created: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Post,
    Author,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Post => Entity::belongs_to(post::Entity)
                .from(Column::PostId)
                .to(post::Column::Id)
                .into(),
            Relation::Author => Entity::belongs_to(user::Entity)
                .from(Column::AuthorId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::Author.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_text(text: &str) -> Result<(), errors::ModelError> {
    check_len("text", text, 500)
}

pub async fn create(db: &DatabaseConnection, post_id: Uuid, author_id: Uuid, text: &str) -> Result<Model, errors::ModelError> {
    validate_text(text)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        post_id: Set(post_id),
        author_id: Set(author_id),
        text: Set(text.to_string()),
        created: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Comments of a post with their authors, newest first.
pub async fn list_for_post(db: &DatabaseConnection, post_id: Uuid) -> Result<Vec<(Model, Option<user::Model>)>, errors::ModelError> {
    Entity::find()
        .filter(Column::PostId.eq(post_id))
        .order_by_desc(Column::Created)
        .find_also_related(user::Entity)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
