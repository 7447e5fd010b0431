use crate::analytics::Analytics;
use crate::config::settings::Settings;

/// Shared by every handler through `web::Data`.
pub struct AppState {
    pub analytics: Analytics,
    pub settings: Settings,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            analytics: Analytics::new(settings.analytics_config()),
            settings,
        }
    }
}
