pub mod mode;

pub use mode::{ApprovalDecision, ApprovalMode};

use std::sync::Arc;

use chrono::Utc;
use steward_tools::Classification;

use crate::domain::{ApprovalMemory, Conversation, ExecutionId, PendingExecution, PendingStatus};
use crate::error::{Error, Result};
use crate::store::PendingStore;

/// Decides whether a tool call suspends for a human decision, and carries
/// out the decision once made. Splits a stateless policy check from a
/// store-backed transition: `requires_approval` never touches the store,
/// `approve`/`reject` always go through
/// `PendingStore::transition`'s compare-and-set.
pub struct ApprovalController {
    pending_store: Arc<dyn PendingStore>,
}

impl ApprovalController {
    pub fn new(pending_store: Arc<dyn PendingStore>) -> Self {
        Self { pending_store }
    }

    /// Whether `tool_name` (with `classification`) must suspend under
    /// `mode`, given what this conversation has already remembered via
    /// `remember: true`. Shell commands are matched against
    /// `approved_shell_patterns` by prefix; every other tool is matched
    /// against `approved_tools` by exact name.
    pub fn requires_approval(
        &self,
        mode: ApprovalMode,
        classification: Classification,
        tool_name: &str,
        shell_command: Option<&str>,
        conversation: &Conversation,
    ) -> bool {
        if mode == ApprovalMode::Auto {
            return false;
        }
        if mode == ApprovalMode::Strict {
            return true;
        }

        // Normal: safe calls never suspend.
        if classification == Classification::Safe {
            return false;
        }

        if conversation.approved_tools.contains(tool_name) {
            return false;
        }
        if let Some(command) = shell_command {
            if conversation
                .approved_shell_patterns
                .iter()
                .any(|pattern| command.starts_with(pattern.as_str()))
            {
                return false;
            }
        }
        true
    }

    pub async fn suspend(&self, pending: PendingExecution) -> Result<()> {
        self.pending_store.create(pending).await
    }

    /// Approves a pending execution, optionally remembering the decision on
    /// `conversation` for the remainder of the session (only meaningful
    /// under `normal` mode; a caller in `strict` mode may still pass
    /// `remember`, it simply has no further effect since every call keeps
    /// suspending).
    pub async fn approve(
        &self,
        execution_id: ExecutionId,
        approver: &str,
        remember: Option<ApprovalMemory>,
        conversation: &mut Conversation,
    ) -> Result<PendingExecution> {
        self.decide(execution_id, PendingStatus::Approved, approver, remember, conversation).await
    }

    pub async fn reject(
        &self,
        execution_id: ExecutionId,
        approver: &str,
        conversation: &mut Conversation,
    ) -> Result<PendingExecution> {
        self.decide(execution_id, PendingStatus::Rejected, approver, None, conversation).await
    }

    async fn decide(
        &self,
        execution_id: ExecutionId,
        new_status: PendingStatus,
        _approver: &str,
        remember: Option<ApprovalMemory>,
        conversation: &mut Conversation,
    ) -> Result<PendingExecution> {
        let before = self
            .pending_store
            .get(execution_id)
            .await?
            .ok_or(Error::PendingNotFound(execution_id))?;
        if before.status == new_status {
            return Ok(before);
        }
        if before.status.is_terminal() {
            return Err(Error::AlreadyDecided(execution_id));
        }

        let after = self
            .pending_store
            .transition(execution_id, new_status)
            .await?
            .ok_or(Error::PendingNotFound(execution_id))?;

        if after.status != before.status && after.status == new_status {
            if let Some(memory) = remember {
                match memory {
                    ApprovalMemory::Tool(name) => {
                        conversation.approved_tools.insert(name);
                    }
                    ApprovalMemory::ShellPattern(pattern) => {
                        conversation.approved_shell_patterns.insert(pattern);
                    }
                }
            }
        }

        Ok(after)
    }

    pub fn new_pending(
        conversation_id: crate::domain::ConversationId,
        call_id: crate::domain::ToolCallId,
        tool_name: String,
        parameters: serde_json::Value,
        classification: Classification,
    ) -> PendingExecution {
        PendingExecution {
            execution_id: ExecutionId::new(),
            conversation_id,
            call_id,
            tool_name,
            parameters,
            classification,
            created_at: Utc::now(),
            status: PendingStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConversationId, ToolCallId};
    use crate::store::InMemoryStore;

    fn conversation() -> Conversation {
        Conversation::new(ConversationId::new(), "t".to_string(), Utc::now())
    }

    #[tokio::test]
    async fn strict_mode_always_requires_approval() {
        let controller = ApprovalController::new(Arc::new(InMemoryStore::new()));
        let conv = conversation();
        assert!(controller.requires_approval(ApprovalMode::Strict, Classification::Safe, "kubectl_get_pods", None, &conv));
    }

    #[tokio::test]
    async fn normal_mode_only_suspends_dangerous_calls() {
        let controller = ApprovalController::new(Arc::new(InMemoryStore::new()));
        let conv = conversation();
        assert!(!controller.requires_approval(ApprovalMode::Normal, Classification::Safe, "kubectl_get_pods", None, &conv));
        assert!(controller.requires_approval(ApprovalMode::Normal, Classification::Dangerous, "kubectl_delete_pod", None, &conv));
    }

    #[tokio::test]
    async fn remembered_tool_skips_future_approval() {
        let controller = ApprovalController::new(Arc::new(InMemoryStore::new()));
        let mut conv = conversation();
        conv.approved_tools.insert("kubectl_delete_pod".to_string());
        assert!(!controller.requires_approval(ApprovalMode::Normal, Classification::Dangerous, "kubectl_delete_pod", None, &conv));
    }

    #[tokio::test]
    async fn approve_then_reject_is_already_decided() {
        let store = Arc::new(InMemoryStore::new());
        let controller = ApprovalController::new(store.clone());
        let mut conv = conversation();

        let pending = ApprovalController::new_pending(
            conv.id,
            ToolCallId::new(),
            "kubectl_delete_pod".to_string(),
            serde_json::json!({}),
            Classification::Dangerous,
        );
        let id = pending.execution_id;
        controller.suspend(pending).await.unwrap();

        controller.approve(id, "alice", None, &mut conv).await.unwrap();
        let err = controller.reject(id, "alice", &mut conv).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyDecided(_)));
    }

    #[tokio::test]
    async fn resending_the_same_decision_is_a_no_op() {
        let store = Arc::new(InMemoryStore::new());
        let controller = ApprovalController::new(store.clone());
        let mut conv = conversation();

        let pending = ApprovalController::new_pending(
            conv.id,
            ToolCallId::new(),
            "kubectl_delete_pod".to_string(),
            serde_json::json!({}),
            Classification::Dangerous,
        );
        let id = pending.execution_id;
        controller.suspend(pending).await.unwrap();

        let first = controller.approve(id, "alice", None, &mut conv).await.unwrap();
        let second = controller.approve(id, "alice", None, &mut conv).await.unwrap();
        assert_eq!(first.execution_id, second.execution_id);
        assert_eq!(second.status, PendingStatus::Approved);
    }
}
