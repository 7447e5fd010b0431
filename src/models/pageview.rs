use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request context that arrives in headers rather than the body.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PageviewContext {
    pub screen_resolution: Option<String>,
    pub timezone: Option<String>,
    pub platform: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Pageview {
    pub id: String,
    pub url: String,
    pub title: Option<String>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub timestamp: DateTime<Utc>,  // Client-reported, or receipt time
    pub tracked_at: DateTime<Utc>, // Server receipt time
    #[serde(flatten)]
    pub context: PageviewContext,
}

impl Pageview {
    pub fn new(
        url: String,
        title: Option<String>,
        referrer: Option<String>,
        user_agent: Option<String>,
        timestamp: Option<DateTime<Utc>>,
        context: PageviewContext,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            url,
            title,
            referrer,
            user_agent,
            timestamp: timestamp.unwrap_or(now),
            tracked_at: now,
            context,
        }
    }
}
