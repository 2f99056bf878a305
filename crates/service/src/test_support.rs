use chrono::{Duration, Utc};
use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::path::PathBuf;
use std::time::Duration as StdDuration;
use uuid::Uuid;

use models::post;

use crate::cache::FeedCache;
use crate::media::MediaStore;
use crate::pagination::Paginator;
use crate::BlogService;

pub use common::utils::logging::log_test_case;

/// 2x1 GIF.
pub const SMALL_GIF: &[u8] = b"GIF89a\x02\x00\x01\x00\x80\x00\x00\x00\x00\x00\xFF\xFF\xFF\x21\xF9\x04\x00\x00\x00\x00\x00\x2C\x00\x00\x00\x00\x02\x00\x01\x00\x00\x02\x02\x0C\x0A\x00\x3B";

/// Unique media root below the system temp directory.
pub fn temp_media() -> PathBuf {
    std::env::temp_dir().join(format!("yatube-media-{}", Uuid::new_v4()))
}

/// Private in-memory database with migrations applied.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    common::utils::logging::init_test_logging();
    let db = models::db::connect_memory().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Service over a fresh database with a long-lived cache.
pub async fn blog() -> Result<BlogService, anyhow::Error> {
    let db = get_db().await?;
    Ok(BlogService::new(
        db,
        FeedCache::new(StdDuration::from_secs(300), 100),
        Paginator::default(),
        MediaStore::new(temp_media()),
    ))
}

/// Insert `n` posts one second apart, oldest first.
pub async fn seed_posts(db: &DatabaseConnection, author_id: Uuid, group_id: Option<Uuid>, n: i64) -> Result<Vec<post::Model>, anyhow::Error> {
    let base = Utc::now() - Duration::seconds(n);
    let mut out = Vec::new();
    for i in 0..n {
        let am = post::ActiveModel {
            id: Set(Uuid::new_v4()),
            text: Set(format!("Тестовый пост {i}")),
            pub_date: Set((base + Duration::seconds(i)).into()),
            author_id: Set(author_id),
            group_id: Set(group_id),
            image: Set(None),
        };
        out.push(am.insert(db).await?);
    }
    Ok(out)
}
