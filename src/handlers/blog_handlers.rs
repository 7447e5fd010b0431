use actix_web::{HttpRequest, HttpResponse, Responder, Result, web};
use validator::Validate;

use crate::handlers::header_string;
use crate::middlewares::origin::request_origin;
use crate::state::app_state::AppState;
use crate::structs::api_response::{ApiError, ApiResponse};
use crate::structs::blog_request::{BlogMultipleAnalyticsRequest, BlogViewResponse, BlogViewsQuery};

/// Count a view of a post for the visitor named in `X-Session-ID`
pub async fn increment_blog_view(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<impl Responder> {
    let slug = path.into_inner();
    let session_id = header_string(&req, "X-Session-ID");
    if let Some(user_agent) = header_string(&req, "X-User-Agent") {
        log::debug!("Blog view of {} from {}", slug, user_agent);
    }

    let increment = app_state.analytics.increment_blog_view(
        &slug,
        session_id.as_deref(),
        request_origin(&req),
    )?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(BlogViewResponse::from(increment))))
}

pub async fn get_blog_analytics(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let slug = path.into_inner();
    HttpResponse::Ok().json(ApiResponse::ok(app_state.analytics.blog_analytics(&slug)))
}

pub async fn get_multiple_blog_analytics(
    app_state: web::Data<AppState>,
    web::Json(req): web::Json<BlogMultipleAnalyticsRequest>,
) -> Result<impl Responder> {
    if let Err(errors) = req.validate() {
        return Ok(HttpResponse::BadRequest().json(ApiError::validation(&errors)));
    }

    let analytics = app_state.analytics.multiple_blog_analytics(&req.slugs);
    Ok(HttpResponse::Ok().json(ApiResponse::ok(analytics)))
}

/// Same as [get_multiple_blog_analytics], with the slugs in `?slugs=a,b`
pub async fn get_multiple_blog_views(
    app_state: web::Data<AppState>,
    query: web::Query<BlogViewsQuery>,
) -> impl Responder {
    let analytics = app_state
        .analytics
        .multiple_blog_analytics(&query.slug_list());
    HttpResponse::Ok().json(ApiResponse::ok(analytics))
}

pub async fn get_blog_stats(app_state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::ok(app_state.analytics.blog_stats()))
}
