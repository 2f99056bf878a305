use sea_orm::{entity::prelude::*, Set, DatabaseConnection, QueryFilter};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::errors::{self, check_len};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "group")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

pub fn validate_title(title: &str) -> Result<(), errors::ModelError> {
    check_len("title", title, 200)
}

pub fn validate_slug(slug: &str) -> Result<(), errors::ModelError> {
    check_len("slug", slug, 100)?;
    if !slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(errors::ModelError::Validation("slug may contain only latin letters, digits, '-' and '_'".into()));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), errors::ModelError> {
    check_len("description", description, 1000)
}

pub async fn create(db: &DatabaseConnection, title: &str, slug: &str, description: &str) -> Result<Model, errors::ModelError> {
    validate_title(title)?;
    validate_slug(slug)?;
    validate_description(description)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title.to_string()),
        slug: Set(slug.to_string()),
        description: Set(description.to_string()),
    };
    am.insert(db).await.map_err(|e| errors::insert_error("group", e))
}

pub async fn find_by_slug(db: &DatabaseConnection, slug: &str) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::Slug.eq(slug))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
