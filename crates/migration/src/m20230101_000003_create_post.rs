//! Create `post` table with FKs to `user` and `group`.
//!
//! Deleting an author removes their posts; deleting a group only detaches them.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Post::Table)
                    .if_not_exists()
                    .col(uuid(Post::Id).primary_key())
                    .col(text(Post::Text).not_null())
                    .col(timestamp_with_time_zone(Post::PubDate).not_null())
                    .col(uuid(Post::AuthorId).not_null())
                    .col(ColumnDef::new(Post::GroupId).uuid().null())
                    .col(ColumnDef::new(Post::Image).string_len(255).null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_author")
                            .from(Post::Table, Post::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_group")
                            .from(Post::Table, Post::GroupId)
                            .to(Group::Table, Group::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Post::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Post { Table, Id, Text, PubDate, AuthorId, GroupId, Image }

#[derive(DeriveIden)]
enum User { Table, Id }

#[derive(DeriveIden)]
enum Group { Table, Id }
