use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::visitor::{Visitor, VisitorAttributes};

#[derive(Deserialize, Serialize, Validate)]
pub struct VisitorTrackRequest {
    pub visitor_id: Option<String>, // Token the client already holds, if any
    #[validate(length(min = 1, message = "user_agent is required"))]
    pub user_agent: String,
    #[validate(length(min = 1, message = "accept_language is required"))]
    pub accept_language: String,
    #[validate(length(min = 1, message = "screen_resolution is required"))]
    pub screen_resolution: String,
    #[validate(length(min = 1, message = "timezone is required"))]
    pub timezone: String,
    #[validate(length(min = 1, message = "platform is required"))]
    pub platform: String,
    #[validate(length(min = 1, message = "language is required"))]
    pub language: String,
    pub referrer: Option<String>,
}

impl VisitorTrackRequest {
    pub fn attributes(&self) -> VisitorAttributes {
        VisitorAttributes {
            user_agent: self.user_agent.clone(),
            accept_language: self.accept_language.clone(),
            screen_resolution: self.screen_resolution.clone(),
            timezone: self.timezone.clone(),
            platform: self.platform.clone(),
            language: self.language.clone(),
            referrer: self.referrer.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct VisitorTrackResponse {
    pub visitor_id: String,
    pub is_new_visitor: bool,
    pub total_visits: u64,
    pub last_visit_at: DateTime<Utc>,
}

impl From<(Visitor, bool)> for VisitorTrackResponse {
    fn from((visitor, is_new_visitor): (Visitor, bool)) -> Self {
        Self {
            visitor_id: visitor.id,
            is_new_visitor,
            total_visits: visitor.total_visits,
            last_visit_at: visitor.last_visit_at,
        }
    }
}

#[derive(Deserialize, Serialize, Validate)]
pub struct VisitorBlogViewRequest {
    #[validate(length(min = 1, message = "visitor_id is required"))]
    pub visitor_id: String,
    #[validate(length(min = 1, message = "blog_slug is required"))]
    pub blog_slug: String,
    pub blog_title: String,
}

#[derive(Serialize)]
pub struct VisitorBlogViewResponse {
    pub view_id: String,
    pub is_new_view: bool,
    pub total_blog_views: usize,
}
