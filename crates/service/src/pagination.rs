//! Database-backed collections for the shared paginator.
//!
//! [`QuerySource`] binds a sea-orm `Select` to a connection so the paginator
//! can count it and fetch exactly one page with `OFFSET`/`LIMIT`. The select
//! must already carry its ordering.
//!
//! The same paginator works over in-memory vectors:
//!
//! ```
//! use service::pagination::Paginator;
//!
//! let items: Vec<u32> = (1..=13).collect();
//! let page = tokio_test::block_on(Paginator::default().paginate(&items, Some("2"))).unwrap();
//! assert_eq!(page.items, vec![11, 12, 13]);
//! assert!(page.has_previous && !page.has_next);
//! ```

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QuerySelect, Select};

pub use common::pagination::{Countable, Page, Paginator, Sliceable, DEFAULT_PER_PAGE};

pub struct QuerySource<'a, E: EntityTrait> {
    db: &'a DatabaseConnection,
    select: Select<E>,
}

impl<'a, E: EntityTrait> QuerySource<'a, E> {
    pub fn new(db: &'a DatabaseConnection, select: Select<E>) -> Self {
        Self { db, select }
    }
}

#[async_trait]
impl<'a, E> Countable for QuerySource<'a, E>
where
    E: EntityTrait,
    E::Model: Send + Sync,
{
    type Error = DbErr;

    async fn count(&self) -> Result<u64, DbErr> {
        self.select.clone().count(self.db).await
    }
}

#[async_trait]
impl<'a, E> Sliceable for QuerySource<'a, E>
where
    E: EntityTrait,
    E::Model: Send + Sync,
{
    type Item = E::Model;

    async fn slice(&self, start: u64, end: u64) -> Result<Vec<E::Model>, DbErr> {
        self.select
            .clone()
            .offset(start)
            .limit(end.saturating_sub(start))
            .all(self.db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_posts};
    use models::{post, user};

    #[tokio::test]
    async fn pages_of_a_query_cover_it_exactly() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let author = user::create(&db, "pager", "pager@example.com", "", "").await?;
        seed_posts(&db, author.id, None, 13).await?;

        let all: Vec<_> = post::newest_first().all(&db).await?.into_iter().map(|p| p.id).collect();
        let source = QuerySource::new(&db, post::newest_first());
        let paginator = Paginator::default();

        let first = paginator.paginate(&source, Some("1")).await?;
        assert_eq!(first.len(), 10);
        assert!(first.has_next);
        assert_eq!(first.total_count, 13);

        let second = paginator.paginate(&source, Some("2")).await?;
        assert_eq!(second.len(), 3);
        assert!(!second.has_next);
        assert!(second.has_previous);

        let joined: Vec<_> = first.into_iter().chain(second).map(|p| p.id).collect();
        assert_eq!(joined, all);
        Ok(())
    }

    #[tokio::test]
    async fn bad_page_text_falls_back() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let author = user::create(&db, "pager2", "pager2@example.com", "", "").await?;
        seed_posts(&db, author.id, None, 13).await?;
        let source = QuerySource::new(&db, post::newest_first());
        let paginator = Paginator::default();

        let first = paginator.paginate(&source, Some("1")).await?;
        assert_eq!(paginator.paginate(&source, Some("abc")).await?, first);
        assert_eq!(paginator.paginate(&source, None).await?, first);
        assert_eq!(paginator.paginate(&source, Some("-4")).await?, first);
        let last = paginator.paginate(&source, Some("99")).await?;
        assert_eq!(last.page_number, 2);
        Ok(())
    }

    #[tokio::test]
    async fn empty_query_is_single_empty_page() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let page = Paginator::default().paginate(&QuerySource::new(&db, post::newest_first()), Some("3")).await?;
        assert!(page.is_empty());
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next && !page.has_previous);
        Ok(())
    }
}
