use serde::Serialize;

use crate::domain::RestrictedItem;
use crate::narrative::{GeneratedDocument, ItemAssessment, ResearchFinding};

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub narrative_enabled: bool,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub rules_version: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        ErrorResponse {
            error: error.into(),
            code: code.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub success: bool,
    #[serde(flatten)]
    pub generated: GeneratedDocument,
}

#[derive(Debug, Serialize)]
pub struct ResearchResponse {
    pub success: bool,
    pub count: usize,
    pub results: Vec<ResearchFinding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl ResearchResponse {
    pub fn new(results: Vec<ResearchFinding>, summary: Option<String>) -> Self {
        ResearchResponse {
            success: true,
            count: results.len(),
            results,
            summary,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HelpChatResponse {
    pub response: String,
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct AssessItemResponse {
    #[serde(flatten)]
    pub assessment: ItemAssessment,
    /// Restricted item stored from this assessment, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restricted_item: Option<RestrictedItem>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}
