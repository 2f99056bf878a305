//! Create `user` table.
//!
//! Post and comment authors as well as followers; usernames and emails are unique.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(uuid(User::Id).primary_key())
                    .col(string_len(User::Username, 150).unique_key().not_null())
                    .col(string_len(User::FirstName, 150).not_null())
                    .col(string_len(User::LastName, 150).not_null())
                    .col(string_len(User::Email, 254).unique_key().not_null())
                    .col(timestamp_with_time_zone(User::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(User::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum User { Table, Id, Username, FirstName, LastName, Email, CreatedAt }
