//! Service layer: the blog's business operations on top of `models`.
//! - Feeds (home, group, profile, followed authors) go through the shared paginator.
//! - Writes validate input, enforce ownership and invalidate the feed cache.
//! - Errors are typed per operation in [`errors::ServiceError`].

pub mod errors;
pub mod runtime;
pub mod pagination;
pub mod cache;
pub mod media;
pub mod observability;
pub mod views;
pub mod blog;
pub mod feeds;
pub mod posts;
pub mod follows;
pub mod users;
#[cfg(test)]
pub mod test_support;

pub use blog::BlogService;
