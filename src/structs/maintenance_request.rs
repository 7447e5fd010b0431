use serde::{Deserialize, Serialize};

use crate::analytics::maintenance::OriginOverview;

#[derive(Deserialize)]
pub struct PurgeParams {
    pub backup: Option<bool>, // Defaults to true
}

#[derive(Serialize)]
pub struct PurgeResponse {
    pub removed_count: usize,
    pub before: OriginOverview,
    pub after: OriginOverview,
    pub backup_file: Option<String>,
}
