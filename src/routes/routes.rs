use actix_web::{HttpResponse, error, web};

use crate::handlers::blog_handlers::{
    get_blog_analytics, get_blog_stats, get_multiple_blog_analytics, get_multiple_blog_views,
    increment_blog_view,
};
use crate::handlers::health_handlers::{api_info, detailed_health_check, health_check, root};
use crate::handlers::maintenance_handlers::{get_origin_overview, purge_local_views};
use crate::handlers::pageview_handlers::{get_pageview_stats, track_pageview};
use crate::handlers::visitor_handlers::{
    get_blog_views, get_visitor_stats, track_blog_view, track_visitor,
};
use crate::middlewares::origin::OriginTagger;
use crate::structs::api_response::ApiError;

fn bad_request<E>(err: E) -> error::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    let body = ApiError::new(err.to_string(), "VALIDATION_ERROR");
    error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

/// Configure the routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // Malformed bodies and queries get the same envelope as validation failures
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| bad_request(err)));
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| bad_request(err)));

    cfg.route("/", web::get().to(root));
    cfg.route("/api", web::get().to(api_info));
    cfg.service(
        web::scope("/api/v1")
            .wrap(OriginTagger)
            .route("/health", web::get().to(health_check))
            .route("/health/detailed", web::get().to(detailed_health_check))
            // Visitors
            .route("/visitors/track", web::post().to(track_visitor))
            .route("/visitors/track-blog-view", web::post().to(track_blog_view))
            .route("/visitors/stats", web::get().to(get_visitor_stats))
            .route("/visitors/blog/{slug}/views", web::get().to(get_blog_views))
            // Pageviews
            .route("/pageviews", web::post().to(track_pageview))
            .route("/pageviews/stats", web::get().to(get_pageview_stats))
            // Blog; fixed paths before `{slug}` so they are not captured by it
            .route("/blog/analytics/stats", web::get().to(get_blog_stats))
            .route(
                "/blog/analytics/multiple",
                web::post().to(get_multiple_blog_analytics),
            )
            .route(
                "/blog/analytics/{slug}/view",
                web::post().to(increment_blog_view),
            )
            .route("/blog/analytics/{slug}", web::get().to(get_blog_analytics))
            .route("/blog/views", web::get().to(get_multiple_blog_views))
            .route("/blog/views/{slug}", web::get().to(get_blog_analytics))
            // Maintenance
            .route("/admin/origins", web::get().to(get_origin_overview))
            .route("/admin/purge", web::post().to(purge_local_views)),
    );
}
