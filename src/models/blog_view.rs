use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::origin::TrafficOrigin;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BlogView {
    pub id: String,
    pub visitor_id: String,
    pub blog_slug: String,
    pub blog_title: String, // Title as reported when the view was tracked
    pub viewed_at: DateTime<Utc>,
    pub is_unique_view: bool, // First view of this slug by this visitor
    pub origin: TrafficOrigin,
}

impl BlogView {
    pub fn new(
        visitor_id: String,
        blog_slug: String,
        blog_title: String,
        viewed_at: DateTime<Utc>,
        is_unique_view: bool,
        origin: TrafficOrigin,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            visitor_id,
            blog_slug,
            blog_title,
            viewed_at,
            is_unique_view,
            origin,
        }
    }

    pub fn is_localhost(&self) -> bool {
        !self.origin.is_canonical()
    }
}
