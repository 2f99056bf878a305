use sea_orm::{entity::prelude::*, Set, DatabaseConnection, QueryFilter};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::{self, check_len};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_username(username: &str) -> Result<(), errors::ModelError> {
    check_len("username", username, 150)?;
    let valid = username.chars().all(|c| c.is_alphanumeric() || matches!(c, '.' | '@' | '+' | '-' | '_'));
    if !valid {
        return Err(errors::ModelError::Validation("username may contain only letters, digits and @/./+/-/_".into()));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), errors::ModelError> {
    check_len("email", email, 254)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(errors::ModelError::Validation("invalid email".into())),
    }
}

pub fn validate_name(field: &str, name: &str) -> Result<(), errors::ModelError> {
    if name.chars().count() > 150 {
        return Err(errors::ModelError::Validation(format!("{field} must be at most 150 characters")));
    }
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    username: &str,
    email: &str,
    first_name: &str,
    last_name: &str,
) -> Result<Model, errors::ModelError> {
    validate_username(username)?;
    validate_email(email)?;
    validate_name("first_name", first_name)?;
    validate_name("last_name", last_name)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        first_name: Set(first_name.to_string()),
        last_name: Set(last_name.to_string()),
        email: Set(email.to_string()),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::insert_error("user", e))
}

pub async fn find_by_username(db: &DatabaseConnection, username: &str) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::Username.eq(username))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn email_taken(db: &DatabaseConnection, email: &str) -> Result<bool, errors::ModelError> {
    let found = Entity::find()
        .filter(Column::Email.eq(email))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(found.is_some())
}
