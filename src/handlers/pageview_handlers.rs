use actix_web::{HttpRequest, HttpResponse, Responder, Result, web};
use validator::Validate;

use crate::handlers::header_string;
use crate::models::pageview::PageviewContext;
use crate::state::app_state::AppState;
use crate::structs::api_response::{ApiError, ApiResponse};
use crate::structs::pageview_request::{PageviewRequest, PageviewResponse};

/// Track a single page view. Screen, timezone, platform and session come in headers.
pub async fn track_pageview(
    app_state: web::Data<AppState>,
    http_req: HttpRequest,
    web::Json(req): web::Json<PageviewRequest>,
) -> Result<impl Responder> {
    if let Err(errors) = req.validate() {
        return Ok(HttpResponse::BadRequest().json(ApiError::validation(&errors)));
    }

    let context = PageviewContext {
        screen_resolution: header_string(&http_req, "X-Screen-Resolution"),
        timezone: header_string(&http_req, "X-Timezone"),
        platform: header_string(&http_req, "X-Platform"),
        session_id: header_string(&http_req, "X-Session-ID"),
    };

    let pageview = app_state.analytics.track_pageview(
        req.url,
        req.title,
        req.referrer,
        req.user_agent,
        req.timestamp,
        context,
    );

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PageviewResponse::from(pageview))))
}

pub async fn get_pageview_stats(app_state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::ok(app_state.analytics.pageview_stats()))
}
