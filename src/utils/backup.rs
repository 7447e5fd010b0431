use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::analytics::error::{AnalyticsError, Result};
use crate::analytics::maintenance::OriginOverview;
use crate::models::blog_view::BlogView;

pub const BACKUP_REASON: &str = "localhost_views_cleanup";

#[derive(Serialize)]
struct Backup<'a> {
    backup_created: DateTime<Utc>,
    backup_reason: &'static str,
    statistics: &'a OriginOverview,
    localhost_views: &'a [BlogView],
    total_views_before: usize,
}

pub fn backup_file_name(at: DateTime<Utc>) -> String {
    format!("analytics_backup_{}.json", at.format("%Y%m%d_%H%M%S"))
}

/// Write the pre-purge statistics and the purged views to a timestamped JSON
/// file in `dir`, giving up after `timeout`.
pub async fn write_backup(
    dir: &Path,
    before: &OriginOverview,
    removed: &[BlogView],
    timeout: Duration,
) -> Result<PathBuf> {
    let now = Utc::now();
    let path = dir.join(backup_file_name(now));
    let body = serde_json::to_vec_pretty(&Backup {
        backup_created: now,
        backup_reason: BACKUP_REASON,
        statistics: before,
        localhost_views: removed,
        total_views_before: before.total_views,
    })?;

    let display = path.display().to_string();
    match tokio::time::timeout(timeout, tokio::fs::write(&path, body)).await {
        Ok(Ok(())) => {
            log::info!("Backup written to {}", display);
            Ok(path)
        }
        Ok(Err(source)) => Err(AnalyticsError::Backup {
            path: display,
            source,
        }),
        Err(_) => Err(AnalyticsError::BackupTimeout(display)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::events::EventStore;
    use crate::analytics::maintenance::plan_purge;
    use crate::models::origin::TrafficOrigin;
    use chrono::TimeZone;

    #[test]
    fn file_name_is_timestamped() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(backup_file_name(at), "analytics_backup_20240309_070501.json");
    }

    #[actix_web::test]
    async fn writes_statistics_and_removed_views() {
        let mut store = EventStore::new();
        store.append_blog_view("P", "x", "X", TrafficOrigin::Production, Utc::now());
        store.append_blog_view("L", "x", "X", TrafficOrigin::Local, Utc::now());
        let plan = plan_purge(&store);

        let dir = std::env::temp_dir().join(format!("blogpulse-backup-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();

        let path = write_backup(&dir, &plan.before, &plan.views, Duration::from_secs(5))
            .await
            .unwrap();
        let written: serde_json::Value =
            serde_json::from_slice(&tokio::fs::read(&path).await.unwrap()).unwrap();
        assert_eq!(written["backup_reason"], BACKUP_REASON);
        assert_eq!(written["total_views_before"], 2);
        assert_eq!(written["statistics"]["localhost_views"], 1);
        assert_eq!(written["localhost_views"][0]["visitor_id"], "L");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[actix_web::test]
    async fn missing_directory_is_an_error() {
        let store = EventStore::new();
        let overview = crate::analytics::maintenance::origin_overview(&store);
        let dir = std::env::temp_dir().join(format!("blogpulse-missing-{}", uuid::Uuid::new_v4()));
        let err = write_backup(&dir, &overview, &[], Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::Backup { .. }));
    }
}
