use actix_web::{HttpResponse, Responder, Result, web};

use crate::state::app_state::AppState;
use crate::structs::api_response::ApiResponse;
use crate::structs::maintenance_request::{PurgeParams, PurgeResponse};
use crate::utils::backup::write_backup;

/// What a purge would remove, without removing it
pub async fn get_origin_overview(app_state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::ok(app_state.analytics.origin_overview()))
}

/// Remove local blog views, archiving them first unless `?backup=false`
pub async fn purge_local_views(
    app_state: web::Data<AppState>,
    query: web::Query<PurgeParams>,
) -> Result<impl Responder> {
    let analytics = &app_state.analytics;
    let settings = &app_state.settings;

    let mut backup_file = None;
    let outcome = if query.backup.unwrap_or(true) {
        let plan = analytics.plan_purge();
        if !plan.is_empty() {
            // Nothing is removed unless the archive was written.
            let path = write_backup(
                &settings.backup_dir,
                &plan.before,
                &plan.views,
                settings.backup_timeout,
            )
            .await
            .inspect_err(|e| log::warn!("Backup failed, purge aborted: {}", e))?;
            backup_file = Some(path.display().to_string());
        }
        analytics.apply_purge(&plan)
    } else {
        analytics.purge_non_canonical()
    };

    let message = if outcome.removed_count == 0 {
        "No local views found".to_string()
    } else {
        format!("Removed {} local views", outcome.removed_count)
    };
    let response = PurgeResponse {
        removed_count: outcome.removed_count,
        before: outcome.before,
        after: outcome.after,
        backup_file,
    };
    Ok(HttpResponse::Ok().json(ApiResponse::ok(response).with_message(message)))
}
