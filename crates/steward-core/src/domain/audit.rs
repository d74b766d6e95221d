use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::{ConversationId, ExecutionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    Success,
    Error,
    Rejected,
    Expired,
}

/// Immutable, write-once record of a completed or rejected execution.
/// Retained 30 days.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub execution_id: ExecutionId,
    pub conversation_id: ConversationId,
    pub tool_name: String,
    pub parameters: Value,
    pub approver: Option<String>,
    pub status: AuditStatus,
    pub requested_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result_size: usize,
    pub result_preview: String,
}

impl AuditRecord {
    pub const RETENTION: chrono::Duration = chrono::Duration::days(30);

    pub fn preview(result_text: &str) -> (usize, String) {
        const MAX_PREVIEW: usize = 500;
        let size = result_text.len();
        let preview = if result_text.chars().count() > MAX_PREVIEW {
            let truncated: String = result_text.chars().take(MAX_PREVIEW).collect();
            format!("{truncated}…")
        } else {
            result_text.to_string()
        };
        (size, preview)
    }
}
