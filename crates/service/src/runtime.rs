//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` to keep binary crates importing
//! `service::runtime::ensure_env` without depending directly on `common`.

/// Ensure the media directory for post images exists.
pub async fn ensure_env(media_dir: &str) -> anyhow::Result<()> {
    common::env::ensure_env(media_dir).await
}
