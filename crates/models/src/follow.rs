use sea_orm::{entity::prelude::*, Set, DatabaseConnection, QueryFilter, PaginatorTrait};
use sea_orm::sea_query::{Query, SelectStatement};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{errors, user};

/// `user_id` follows `author_id`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "follow")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub author_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    Author,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
            Relation::Author => Entity::belongs_to(user::Entity)
                .from(Column::AuthorId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn find(db: &DatabaseConnection, user_id: Uuid, author_id: Uuid) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::AuthorId.eq(author_id))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Returns the follow and whether it was created by this call.
///
/// A concurrent insert of the same pair trips the unique index; the row it
/// left behind is returned as already existing.
pub async fn get_or_create(db: &DatabaseConnection, user_id: Uuid, author_id: Uuid) -> Result<(Model, bool), errors::ModelError> {
    if let Some(existing) = find(db, user_id, author_id).await? {
        return Ok((existing, false));
    }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        author_id: Set(author_id),
    };
    match am.insert(db).await.map_err(|e| errors::insert_error("follow", e)) {
        Ok(created) => Ok((created, true)),
        Err(errors::ModelError::Conflict(msg)) => find(db, user_id, author_id)
            .await?
            .map(|existing| (existing, false))
            .ok_or(errors::ModelError::Conflict(msg)),
        Err(e) => Err(e),
    }
}

/// Returns true if a follow was removed.
pub async fn delete_pair(db: &DatabaseConnection, user_id: Uuid, author_id: Uuid) -> Result<bool, errors::ModelError> {
    let res = Entity::delete_many()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::AuthorId.eq(author_id))
        .exec(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(res.rows_affected > 0)
}

/// Sub-select of the author ids `user_id` follows.
pub fn followed_author_ids(user_id: Uuid) -> SelectStatement {
    Query::select()
        .column(Column::AuthorId)
        .from(Entity)
        .and_where(Column::UserId.eq(user_id))
        .to_owned()
}

pub async fn count_followers(db: &DatabaseConnection, author_id: Uuid) -> Result<u64, errors::ModelError> {
    Entity::find()
        .filter(Column::AuthorId.eq(author_id))
        .count(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
