//! Periodic purge of expired and revoked refresh-token sessions.

use std::time::Duration;

use scenra_db::repositories::SessionRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// How often the purge runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Delete dead sessions once. Returns how many rows were removed.
pub async fn sweep(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let deleted = SessionRepo::cleanup_expired(pool).await?;
    if deleted > 0 {
        tracing::info!(deleted, "Session cleanup: purged dead sessions");
    } else {
        tracing::debug!("Session cleanup: nothing to purge");
    }
    Ok(deleted)
}

/// Run the cleanup loop until `cancel` fires. The first sweep happens
/// immediately.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        "Session cleanup job started"
    );
    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                tracing::info!("Session cleanup job stopping");
                break;
            }
            _ = interval.tick() => {
                if let Err(e) = sweep(&pool).await {
                    tracing::error!(error = %e, "Session cleanup failed");
                }
            }
        }
    }
}
