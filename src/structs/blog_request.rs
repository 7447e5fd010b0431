use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::analytics::BlogViewIncrement;

#[derive(Deserialize, Validate)]
pub struct BlogMultipleAnalyticsRequest {
    #[validate(length(min = 1, message = "At least one slug is required"))]
    pub slugs: Vec<String>,
}

/// `?slugs=a,b,c`
#[derive(Deserialize)]
pub struct BlogViewsQuery {
    pub slugs: String,
}

impl BlogViewsQuery {
    pub fn slug_list(&self) -> Vec<String> {
        self.slugs
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

#[derive(Serialize)]
pub struct BlogViewResponse {
    pub slug: String,
    pub total_views: usize,
    pub unique_views: usize,
    pub is_new_view: bool,
}

impl From<BlogViewIncrement> for BlogViewResponse {
    fn from(increment: BlogViewIncrement) -> Self {
        Self {
            slug: increment.slug,
            total_views: increment.total_views,
            unique_views: increment.unique_views,
            is_new_view: increment.is_new_view,
        }
    }
}
