use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use crate::structs::api_response::ApiError;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Unknown visitor: {0}")]
    UnknownVisitor(String),
    #[error("Failed to write backup {path}: {source}")]
    Backup {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Writing backup {0} timed out")]
    BackupTimeout(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AnalyticsError {
    pub fn code(&self) -> &'static str {
        match self {
            AnalyticsError::UnknownVisitor(_) => "VISITOR_NOT_FOUND",
            AnalyticsError::Backup { .. } | AnalyticsError::BackupTimeout(_) => "BACKUP_FAILED",
            AnalyticsError::Serialization(_) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AnalyticsError {
    fn status_code(&self) -> StatusCode {
        match self {
            AnalyticsError::UnknownVisitor(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiError::new(self.to_string(), self.code()))
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
