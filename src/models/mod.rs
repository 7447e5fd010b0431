pub mod blog_view;
pub mod origin;
pub mod pageview;
pub mod visitor;
