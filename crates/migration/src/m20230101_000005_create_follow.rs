//! Create `follow` table: `user_id` follows `author_id`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Follow::Table)
                    .if_not_exists()
                    .col(uuid(Follow::Id).primary_key())
                    .col(uuid(Follow::UserId).not_null())
                    .col(uuid(Follow::AuthorId).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_follow_user")
                            .from(Follow::Table, Follow::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_follow_author")
                            .from(Follow::Table, Follow::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Follow::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Follow { Table, Id, UserId, AuthorId }

#[derive(DeriveIden)]
enum User { Table, Id }
