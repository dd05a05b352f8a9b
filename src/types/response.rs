// src/types/response.rs
use serde::{Deserialize, Serialize};

// ===== Service Response Types =====

#[derive(Debug, Serialize, Deserialize)]
pub struct InterviewUploadResponse {
    pub status: String,
    pub interview_id: Option<String>,
    pub message: Option<String>,
}

/// Result of one named CSV export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExportOutcome {
    Exported { filename: String, rows: usize },
    NothingToExport,
}
