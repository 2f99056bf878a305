//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20230101_000001_create_user;
mod m20230101_000002_create_group;
mod m20230101_000003_create_post;
mod m20230101_000004_create_comment;
mod m20230101_000005_create_follow;
mod m20230101_000006_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20230101_000001_create_user::Migration),
            Box::new(m20230101_000002_create_group::Migration),
            Box::new(m20230101_000003_create_post::Migration),
            Box::new(m20230101_000004_create_comment::Migration),
            Box::new(m20230101_000005_create_follow::Migration),
            // Indexes should always be applied last
            Box::new(m20230101_000006_add_indexes::Migration),
        ]
    }
}
