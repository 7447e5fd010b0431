pub mod api_response;
pub mod blog_request;
pub mod maintenance_request;
pub mod pageview_request;
pub mod visitor_request;
