use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::pageview::Pageview;

#[derive(Deserialize, Serialize, Validate)]
pub struct PageviewRequest {
    #[validate(length(min = 1, message = "url is required"))]
    pub url: String,
    pub title: Option<String>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct PageviewResponse {
    pub pageview_id: String,
    pub tracked_at: DateTime<Utc>,
}

impl From<Pageview> for PageviewResponse {
    fn from(pageview: Pageview) -> Self {
        Self {
            pageview_id: pageview.id,
            tracked_at: pageview.tracked_at,
        }
    }
}
