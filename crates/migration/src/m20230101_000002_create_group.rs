//! Create `group` table.
//!
//! Communities a post can optionally belong to, addressed by slug.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Group::Table)
                    .if_not_exists()
                    .col(uuid(Group::Id).primary_key())
                    .col(string_len(Group::Title, 200).not_null())
                    .col(string_len(Group::Slug, 100).unique_key().not_null())
                    .col(text(Group::Description).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Group::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Group { Table, Id, Title, Slug, Description }
