//! sea-orm entities for the blog schema plus their validation and
//! creation helpers.

pub mod errors;
pub mod db;
pub mod user;
pub mod group;
pub mod post;
pub mod comment;
pub mod follow;

#[cfg(test)]
mod tests;
