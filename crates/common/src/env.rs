//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::{info, warn};

/// Ensure the media directory (uploaded post images) exists.
pub async fn ensure_env(media_dir: &str) -> anyhow::Result<()> {
    if tokio::fs::metadata(media_dir).await.is_err() {
        warn!(%media_dir, "media directory not found; creating it");
    }
    let posts_dir = format!("{media_dir}/posts");
    tokio::fs::create_dir_all(&posts_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {posts_dir}: {e}"))?;
    info!(%media_dir, "media directory ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::ensure_env;

    #[tokio::test]
    async fn creates_posts_subdirectory() -> anyhow::Result<()> {
        let root = std::env::temp_dir().join(format!("yatube-media-{}", std::process::id()));
        let root_str = root.to_string_lossy().to_string();
        ensure_env(&root_str).await?;
        assert!(root.join("posts").is_dir());
        tokio::fs::remove_dir_all(&root).await?;
        Ok(())
    }
}
