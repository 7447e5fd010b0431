use actix_web::{HttpRequest, HttpResponse, Responder, Result, web};
use validator::Validate;

use crate::middlewares::origin::request_origin;
use crate::state::app_state::AppState;
use crate::structs::api_response::{ApiError, ApiResponse};
use crate::structs::visitor_request::{
    VisitorBlogViewRequest, VisitorBlogViewResponse, VisitorTrackRequest, VisitorTrackResponse,
};

/// Track a new or returning visitor
pub async fn track_visitor(
    app_state: web::Data<AppState>,
    web::Json(req): web::Json<VisitorTrackRequest>,
) -> Result<impl Responder> {
    if let Err(errors) = req.validate() {
        return Ok(HttpResponse::BadRequest().json(ApiError::validation(&errors)));
    }

    let tracked = app_state
        .analytics
        .track_visitor(req.attributes(), req.visitor_id.as_deref());

    Ok(HttpResponse::Ok().json(ApiResponse::ok(VisitorTrackResponse::from(tracked))))
}

/// Track a visitor viewing a blog post
pub async fn track_blog_view(
    app_state: web::Data<AppState>,
    http_req: HttpRequest,
    web::Json(req): web::Json<VisitorBlogViewRequest>,
) -> Result<impl Responder> {
    if let Err(errors) = req.validate() {
        return Ok(HttpResponse::BadRequest().json(ApiError::validation(&errors)));
    }

    let (view, total_blog_views) = app_state.analytics.track_blog_view(
        &req.visitor_id,
        &req.blog_slug,
        &req.blog_title,
        request_origin(&http_req),
    )?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(VisitorBlogViewResponse {
        view_id: view.id,
        is_new_view: view.is_unique_view,
        total_blog_views,
    })))
}

pub async fn get_visitor_stats(app_state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::ok(app_state.analytics.visitor_stats()))
}

pub async fn get_blog_views(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let slug = path.into_inner();
    HttpResponse::Ok().json(ApiResponse::ok(app_state.analytics.blog_views(&slug)))
}
