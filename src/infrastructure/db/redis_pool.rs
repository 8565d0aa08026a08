use deadpool_redis::{Config, Pool, Runtime};

/// Builds the deny-list pool. Connections are opened lazily, so an unreachable
/// server only shows up on first use.
pub fn create_redis_pool(redis_url: Option<&str>) -> Option<Pool> {
    let url = redis_url?.trim();
    if url.is_empty() {
        return None;
    }

    Config::from_url(url)
        .create_pool(Some(Runtime::Tokio1))
        .map_err(|e| tracing::error!("Redis pool creation error: {}", e))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_url_means_no_pool() {
        assert!(create_redis_pool(None).is_none());
        assert!(create_redis_pool(Some("  ")).is_none());
    }
}
