use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use steward_tools::{ToolCall, ToolResult};

use super::types::{ConversationId, ExecutionId, TurnId};

/// One entry in a conversation's append-only log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TurnBody {
    User {
        text: String,
    },
    Assistant {
        text: Option<String>,
        tool_calls: Vec<ToolCall>,
    },
    ToolResult {
        call_id: String,
        status: ToolResultStatus,
        result: Option<ToolResult>,
        execution_id: Option<ExecutionId>,
        reason: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolResultStatus {
    Ok,
    Error,
    ApprovalRequired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub id: TurnId,
    /// Monotonic per-conversation counter assigned by the store on append.
    pub sequence: u64,
    pub created_at: DateTime<Utc>,
    pub body: TurnBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub turns: Vec<Turn>,
    /// Tools pre-approved via `remember` for the remainder of this
    /// conversation under `normal` mode.
    pub approved_tools: std::collections::HashSet<String>,
    /// Shell command prefixes pre-approved the same way.
    pub approved_shell_patterns: std::collections::HashSet<String>,
}

impl Conversation {
    pub fn new(id: ConversationId, title: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            created_at: now,
            last_updated: now,
            turns: Vec::new(),
            approved_tools: Default::default(),
            approved_shell_patterns: Default::default(),
        }
    }

    pub fn next_sequence(&self) -> u64 {
        self.turns.last().map(|t| t.sequence + 1).unwrap_or(0)
    }

    pub fn push(&mut self, body: TurnBody, now: DateTime<Utc>) -> TurnId {
        let id = TurnId::new();
        let sequence = self.next_sequence();
        self.turns.push(Turn {
            id,
            sequence,
            created_at: now,
            body,
        });
        self.last_updated = now;
        id
    }

    pub fn message_count(&self) -> usize {
        self.turns.len()
    }
}

/// First 60 characters of the first user message, truncated at a word
/// boundary with an ellipsis. No LLM call is spent summarizing a title.
pub fn derive_title(first_user_text: &str) -> String {
    const MAX_LEN: usize = 60;
    let trimmed = first_user_text.trim();
    if trimmed.chars().count() <= MAX_LEN {
        return trimmed.to_string();
    }

    let truncated: String = trimmed.chars().take(MAX_LEN).collect();
    let cut = truncated
        .rfind(char::is_whitespace)
        .unwrap_or(truncated.len());
    let mut title = truncated[..cut].trim_end().to_string();
    title.push('…');
    title
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_title_unchanged() {
        assert_eq!(derive_title("scale up frontend"), "scale up frontend");
    }

    #[test]
    fn long_title_truncates_at_word_boundary() {
        let text = "please list every pod in the production namespace and summarize their restart counts today";
        let title = derive_title(text);
        assert!(title.ends_with('…'));
        assert!(title.chars().count() <= 61);
        assert!(!title.trim_end_matches('…').ends_with(' '));
    }
}
