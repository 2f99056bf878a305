use once_cell::sync::Lazy;
use prometheus::{register_int_counter, Encoder, IntCounter, TextEncoder};

// Prometheus metrics (default registry)
pub static FEED_CACHE_HITS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "yatube_feed_cache_hits_total",
        "Home feed requests served from the cache"
    )
    .expect("register feed_cache_hits_total")
});

pub static FEED_CACHE_MISSES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "yatube_feed_cache_misses_total",
        "Home feed requests rendered from the database"
    )
    .expect("register feed_cache_misses_total")
});

pub static POSTS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "yatube_posts_created_total",
        "Total posts published"
    )
    .expect("register posts_created_total")
});

pub static COMMENTS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "yatube_comments_created_total",
        "Total comments added"
    )
    .expect("register comments_created_total")
});

/// Text exposition of every registered metric.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}
