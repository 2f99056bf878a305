//! Shared building blocks: pagination, logging setup, runtime checks and
//! small wire types used by both the service layer and the HTTP server.

pub mod types;
pub mod utils;
pub mod pagination;
pub mod env;
