use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;

use crate::config::settings::VERSION;
use crate::state::app_state::AppState;
use crate::structs::api_response::ApiResponse;

const SERVICE_NAME: &str = "Remco Stoeten API";

pub async fn root(state: web::Data<AppState>) -> impl Responder {
    let settings = &state.settings;
    HttpResponse::Ok().json(serde_json::json!({
        "message": SERVICE_NAME,
        "version": VERSION,
        "environment": settings.environment,
    }))
}

pub async fn api_info(state: web::Data<AppState>) -> impl Responder {
    let settings = &state.settings;
    HttpResponse::Ok().json(serde_json::json!({
        "name": SERVICE_NAME,
        "version": VERSION,
        "environment": settings.environment,
        "production": settings.is_production(),
        "features": {
            "analytics": settings.enable_analytics,
            "strict_visitor_references": settings.strict_visitor_references,
        },
        "endpoints": {
            "health": "/api/v1/health",
        }
    }))
}

pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::ok(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now(),
        "version": VERSION,
        "environment": state.settings.environment,
    })))
}

/// Health plus feature flags and the size of the in-memory store.
pub async fn detailed_health_check(state: web::Data<AppState>) -> impl Responder {
    let settings = &state.settings;
    HttpResponse::Ok().json(ApiResponse::ok(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now(),
        "version": VERSION,
        "environment": settings.environment,
        "features": {
            "analytics": settings.enable_analytics,
            "strict_visitor_references": settings.strict_visitor_references,
        },
        "store": state.analytics.sizes(),
    })))
}
