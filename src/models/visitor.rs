use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::fingerprint::derive_fingerprint;

/// Client-reported attributes a visitor is identified by.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VisitorAttributes {
    pub user_agent: String,
    pub accept_language: String,
    pub screen_resolution: String,
    pub timezone: String,
    pub platform: String,
    pub language: String,
    pub referrer: Option<String>,
}

impl VisitorAttributes {
    /// Placeholder attributes registered when a blog view names a visitor
    /// the registry has never seen.
    pub fn unknown() -> Self {
        Self {
            user_agent: "unknown".to_string(),
            accept_language: "unknown".to_string(),
            screen_resolution: "unknown".to_string(),
            timezone: "UTC".to_string(),
            platform: "unknown".to_string(),
            language: "unknown".to_string(),
            referrer: None,
        }
    }

    /// `language` and `referrer` are stored but do not contribute.
    pub fn fingerprint(&self) -> String {
        derive_fingerprint(
            &self.user_agent,
            &self.accept_language,
            &self.screen_resolution,
            &self.timezone,
            &self.platform,
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Visitor {
    pub id: String, // The derived fingerprint
    #[serde(flatten)]
    pub attributes: VisitorAttributes,
    pub first_visit_at: DateTime<Utc>,
    pub last_visit_at: DateTime<Utc>,
    pub total_visits: u64,
    pub visits: Vec<DateTime<Utc>>, // One entry per tracking call
}

impl Visitor {
    pub fn new(attributes: VisitorAttributes, now: DateTime<Utc>) -> Self {
        Self {
            id: attributes.fingerprint(),
            attributes,
            first_visit_at: now,
            last_visit_at: now,
            total_visits: 1,
            visits: vec![now],
        }
    }

    pub fn record_visit(&mut self, now: DateTime<Utc>) {
        self.total_visits += 1;
        self.last_visit_at = now;
        self.visits.push(now);
    }

    pub fn is_new_visitor(&self) -> bool {
        self.total_visits == 1
    }
}
