use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use steward_tools::Classification;

use super::types::{ConversationId, ExecutionId, ToolCallId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingStatus {
    Pending,
    Approved,
    Rejected,
    Expired,
}

impl PendingStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, PendingStatus::Pending)
    }
}

/// A suspended tool call awaiting human approval. TTL: 1 hour from
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingExecution {
    pub execution_id: ExecutionId,
    pub conversation_id: ConversationId,
    pub call_id: ToolCallId,
    pub tool_name: String,
    pub parameters: Value,
    pub classification: Classification,
    pub created_at: DateTime<Utc>,
    pub status: PendingStatus,
}

impl PendingExecution {
    pub const TTL: chrono::Duration = chrono::Duration::hours(1);

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == PendingStatus::Pending && now - self.created_at > Self::TTL
    }
}

/// What an `approve` call may additionally request: pre-approving the tool
/// (or a shell command prefix) for the rest of the conversation under
/// `normal` mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ApprovalMemory {
    Tool(String),
    ShellPattern(String),
}
