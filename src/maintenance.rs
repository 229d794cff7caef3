use std::sync::Arc;

use log::{info, warn};
use tokio::task::JoinHandle;

use crate::{config::Config, session::SessionStore, utils::cleanup_old_files};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub sessions: usize,
    pub files: usize,
}

/// Drops stale sessions (only when a TTL is configured) and leftover downloads.
pub async fn sweep(sessions: &SessionStore, config: &Config) -> SweepReport {
    let mut report = SweepReport::default();

    if let Some(ttl) = config.session_ttl {
        report.sessions = sessions.sweep_stale(ttl).await;
    }

    match cleanup_old_files(&config.download_path, config.file_max_age).await {
        Ok(removed) => report.files = removed,
        Err(e) => warn!(
            "Could not clean {}: {}",
            config.download_path.display(),
            e
        ),
    }

    report
}

/// Runs [`sweep`] every `cleanup_interval`. A zero interval disables it.
pub fn spawn(sessions: SessionStore, config: Arc<Config>) -> Option<JoinHandle<()>> {
    if config.cleanup_interval.is_zero() {
        return None;
    }

    Some(tokio::spawn(async move {
        loop {
            // sleep saturates on huge intervals where Instant arithmetic would panic.
            tokio::time::sleep(config.cleanup_interval).await;
            let report = sweep(&sessions, &config).await;
            info!(
                "Maintenance: removed {} sessions and {} files, {} sessions active",
                report.sessions,
                report.files,
                sessions.len().await
            );
        }
    }))
}
