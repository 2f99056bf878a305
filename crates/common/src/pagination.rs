//! Page provider shared by every list endpoint.
//!
//! A [`Paginator`] cuts an ordered collection into fixed-size pages. The
//! requested page arrives as raw query text and is never rejected: absent or
//! non-numeric input selects the first page, numbers below 1 select the first
//! page and numbers past the end select the last one.
//!
//! Collections are anything implementing [`Countable`] + [`Sliceable`]; the
//! service crate implements both for database queries, and `Vec<T>` gets an
//! in-memory implementation here.
//!
//! An empty collection reports `total_pages == 1`: a single empty first page.
//!
//! ```
//! use common::pagination::Paginator;
//!
//! let items: Vec<u32> = (1..=13).collect();
//! let paginator = Paginator::new(10);
//!
//! let first = paginator.paginate_slice(&items, None);
//! assert_eq!(first.len(), 10);
//! assert!(first.has_next);
//!
//! let last = paginator.paginate_slice(&items, Some("2"));
//! assert_eq!(last.items, vec![11, 12, 13]);
//! assert!(last.has_previous && !last.has_next);
//!
//! // garbage falls back to the first page
//! assert_eq!(paginator.paginate_slice(&items, Some("abc")), first);
//! ```

use std::convert::Infallible;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Items per page when the caller does not configure one.
pub const DEFAULT_PER_PAGE: u64 = 10;

/// A collection that can report how many items it holds.
#[async_trait]
pub trait Countable {
    type Error: Send;

    async fn count(&self) -> Result<u64, Self::Error>;
}

/// A collection that can hand out the half-open range `[start, end)` of its
/// items, in the collection's own order.
#[async_trait]
pub trait Sliceable: Countable {
    type Item: Send;

    async fn slice(&self, start: u64, end: u64) -> Result<Vec<Self::Item>, Self::Error>;
}

/// Resolved position of a page within a collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index, always within `1..=total_pages`
    pub page: u64,
    /// items per page
    pub per_page: u64,
    pub total_pages: u64,
    pub total_count: u64,
}

impl Pagination {
    /// Half-open item range covered by this page.
    pub fn bounds(&self) -> (u64, u64) {
        let start = (self.page - 1).saturating_mul(self.per_page);
        let end = start.saturating_add(self.per_page).min(self.total_count);
        (start.min(end), end)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// One page of a collection plus the navigation metadata a view needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: u64,
    pub total_pages: u64,
    pub total_count: u64,
    pub per_page: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, at: Pagination) -> Self {
        Self {
            items,
            page_number: at.page,
            total_pages: at.total_pages,
            total_count: at.total_count,
            per_page: at.per_page,
            has_next: at.has_next(),
            has_previous: at.has_previous(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn next_page_number(&self) -> Option<u64> {
        self.has_next.then(|| self.page_number + 1)
    }

    pub fn previous_page_number(&self) -> Option<u64> {
        self.has_previous.then(|| self.page_number - 1)
    }

    /// Convert the items while keeping the navigation metadata.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_number: self.page_number,
            total_pages: self.total_pages,
            total_count: self.total_count,
            per_page: self.per_page,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Number of pages needed for `count` items; never less than one.
pub fn total_pages(count: u64, per_page: u64) -> u64 {
    let per_page = per_page.max(1);
    count.div_ceil(per_page).max(1)
}

enum Requested {
    BelowRange,
    Index(u64),
}

fn parse_requested(raw: &str) -> Option<Requested> {
    let s = raw.trim();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if negative {
        return Some(Requested::BelowRange);
    }
    // only overflow can fail here
    let n = digits.parse::<u64>().unwrap_or(u64::MAX);
    Some(if n == 0 { Requested::BelowRange } else { Requested::Index(n) })
}

/// Map raw page text onto `1..=total_pages`.
pub fn resolve_page_number(requested: Option<&str>, total_pages: u64) -> u64 {
    let last = total_pages.max(1);
    match requested.and_then(parse_requested) {
        None | Some(Requested::BelowRange) => 1,
        Some(Requested::Index(n)) => n.min(last),
    }
}

/// Splits collections into pages of `per_page` items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Paginator {
    per_page: u64,
}

impl Paginator {
    /// A zero page size is bumped to 1.
    pub fn new(per_page: u64) -> Self {
        Self { per_page: per_page.max(1) }
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Resolve the requested page against a collection of `total_count` items.
    pub fn locate(&self, total_count: u64, requested: Option<&str>) -> Pagination {
        let total_pages = total_pages(total_count, self.per_page);
        Pagination {
            page: resolve_page_number(requested, total_pages),
            per_page: self.per_page,
            total_pages,
            total_count,
        }
    }

    /// Count the collection, pick the page and fetch only its items.
    pub async fn paginate<C>(&self, collection: &C, requested: Option<&str>) -> Result<Page<C::Item>, C::Error>
    where
        C: Sliceable + Sync,
    {
        let count = collection.count().await?;
        let at = self.locate(count, requested);
        let (start, end) = at.bounds();
        let items = if start < end { collection.slice(start, end).await? } else { Vec::new() };
        Ok(Page::new(items, at))
    }

    /// In-memory variant for callers that already hold the whole collection.
    pub fn paginate_slice<T: Clone>(&self, items: &[T], requested: Option<&str>) -> Page<T> {
        let at = self.locate(items.len() as u64, requested);
        let (start, end) = at.bounds();
        Page::new(items[start as usize..end as usize].to_vec(), at)
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE)
    }
}

#[async_trait]
impl<T: Send + Sync> Countable for Vec<T> {
    type Error = Infallible;

    async fn count(&self) -> Result<u64, Self::Error> {
        Ok(self.len() as u64)
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> Sliceable for Vec<T> {
    type Item = T;

    async fn slice(&self, start: u64, end: u64) -> Result<Vec<T>, Self::Error> {
        let end = (end as usize).min(self.len());
        let start = (start as usize).min(end);
        Ok(self[start..end].to_vec())
    }
}
