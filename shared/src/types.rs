//! Common types used across the platform

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of one item in a batch operation. Batch operations never roll
/// back successful siblings; the caller gets one result per item and retries
/// failures individually.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItemResult {
    pub public_id: Uuid,
    pub status: BatchItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchItemStatus {
    Ok,
    Failed,
}

impl BatchItemResult {
    pub fn ok(public_id: Uuid) -> Self {
        Self {
            public_id,
            status: BatchItemStatus::Ok,
            error: None,
        }
    }

    pub fn failed(public_id: Uuid, error: impl Into<String>) -> Self {
        Self {
            public_id,
            status: BatchItemStatus::Failed,
            error: Some(error.into()),
        }
    }
}

/// Summary line for a batch response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<BatchItemResult>,
}

impl BatchResponse {
    pub fn from_results(results: Vec<BatchItemResult>) -> Self {
        let succeeded = results
            .iter()
            .filter(|r| r.status == BatchItemStatus::Ok)
            .count();
        Self {
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }
}
