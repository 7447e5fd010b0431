pub mod blog_handlers;
pub mod health_handlers;
pub mod maintenance_handlers;
pub mod pageview_handlers;
pub mod visitor_handlers;

use actix_web::HttpRequest;

/// A header's value as an owned string, if present and valid UTF-8.
pub(crate) fn header_string(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}
