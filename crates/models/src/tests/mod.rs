

use anyhow::Result;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;

/// Fresh in-memory database with the full schema applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    common::utils::logging::init_test_logging();
    let db = crate::db::connect_memory().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}
