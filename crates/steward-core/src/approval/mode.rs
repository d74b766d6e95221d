use serde::{Deserialize, Serialize};

/// Per-turn policy governing when tool calls suspend for a human decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalMode {
    /// Every call suspends.
    Strict,
    /// Safe calls auto-execute; dangerous calls suspend.
    Normal,
    /// No call suspends; dangerous calls are logged with `approver = "auto"`.
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    Approve,
    Reject,
}
