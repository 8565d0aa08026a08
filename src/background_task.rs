use std::sync::Arc;

use tokio::time::{interval, Duration};

use crate::repositories::user::UserRepository;

/// Purges soft-deleted accounts once a day.
pub async fn start_purge_task(repo: Arc<dyn UserRepository>) {
    let mut interval = interval(Duration::from_secs(60 * 60 * 24));

    loop {
        interval.tick().await;

        match repo.purge_soft_deleted_users().await {
            Ok(count) => tracing::info!("Purged {} soft-deleted users", count),
            Err(e) => tracing::error!("Purge failed: {}", e)
        }
    }
}
