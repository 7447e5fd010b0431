use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a tracked blog view came from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrafficOrigin {
    /// Canonical traffic from the deployed site.
    #[default]
    #[serde(rename = "production")]
    Production,
    /// Non-canonical traffic from a development machine.
    #[serde(rename = "local")]
    Local,
}

impl TrafficOrigin {
    pub fn is_canonical(&self) -> bool {
        matches!(self, TrafficOrigin::Production)
    }
}

impl fmt::Display for TrafficOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrafficOrigin::Production => write!(f, "production"),
            TrafficOrigin::Local => write!(f, "local"),
        }
    }
}
