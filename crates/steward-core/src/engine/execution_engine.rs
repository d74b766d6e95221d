//! Steps 1-7 of the tool-call contract: lookup, validate, classify,
//! suspend-if-needed, dispatch with timeout, validate the result, audit.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::warn;

use steward_tools::tools::EXECUTE_SHELL_COMMAND;
use steward_tools::{ToolError, ToolResult};

use crate::approval::{ApprovalController, ApprovalMode};
use crate::domain::{AuditRecord, AuditStatus, Conversation, ExecutionId, PendingExecution, ToolCallId};
use crate::error::{Error, Result};
use crate::store::AuditStore;
use crate::tools::{Registry, ToolContext};
use crate::validation::{self, ValidatorRegistry};

/// What came out of one `execute()` call.
pub enum Outcome {
    Completed {
        status: AuditStatus,
        result: ToolResult,
        notes: Vec<validation::ValidationNote>,
    },
    Suspended {
        execution_id: ExecutionId,
    },
}

pub struct ExecutionEngine {
    registry: Arc<Registry>,
    validators: ValidatorRegistry,
    approval: ApprovalController,
    audit_store: Arc<dyn AuditStore>,
}

impl ExecutionEngine {
    pub fn new(registry: Arc<Registry>, approval: ApprovalController, audit_store: Arc<dyn AuditStore>) -> Self {
        Self {
            registry,
            validators: ValidatorRegistry::standard(),
            approval,
            audit_store,
        }
    }

    /// Runs steps 1-4: a call that does not need to suspend proceeds straight
    /// through to dispatch; one that does returns `Outcome::Suspended` and
    /// the caller is responsible for surfacing the pending execution id.
    pub async fn execute(
        &self,
        tool_name: &str,
        call_id: ToolCallId,
        params: serde_json::Value,
        conversation: &mut Conversation,
        mode: ApprovalMode,
        ctx: &ToolContext,
    ) -> Result<Outcome> {
        let handler = self
            .registry
            .get(tool_name)
            .ok_or_else(|| Error::Tool(ToolError::UnknownTool(tool_name.to_string())))?;

        self.validators.validate(tool_name, &params).map_err(Error::Tool)?;

        let classification = handler.schema().classification;
        let shell_command = (tool_name == EXECUTE_SHELL_COMMAND)
            .then(|| params.get("command").and_then(serde_json::Value::as_str))
            .flatten();

        if self.approval.requires_approval(mode, classification, tool_name, shell_command, conversation) {
            let pending = ApprovalController::new_pending(conversation.id, call_id, tool_name.to_string(), params, classification);
            let execution_id = pending.execution_id;
            self.approval.suspend(pending).await?;
            return Ok(Outcome::Suspended { execution_id });
        }

        let approver = (mode == ApprovalMode::Auto && classification.is_dangerous()).then(|| "auto".to_string());
        self.run_and_audit(tool_name, params, conversation.id, approver, None, ctx).await
    }

    /// Runs a previously-suspended call after a human decision approved it.
    pub async fn run_approved(&self, pending: PendingExecution, approver: &str, ctx: &ToolContext) -> Result<Outcome> {
        self.run_and_audit(
            &pending.tool_name,
            pending.parameters,
            pending.conversation_id,
            Some(approver.to_string()),
            Some(pending.created_at),
            ctx,
        )
        .await
    }

    async fn run_and_audit(
        &self,
        tool_name: &str,
        params: serde_json::Value,
        conversation_id: crate::domain::ConversationId,
        approver: Option<String>,
        requested_at_override: Option<chrono::DateTime<Utc>>,
        ctx: &ToolContext,
    ) -> Result<Outcome> {
        let handler = self
            .registry
            .get(tool_name)
            .ok_or_else(|| Error::Tool(ToolError::UnknownTool(tool_name.to_string())))?;

        let requested_at = requested_at_override.unwrap_or_else(Utc::now);
        let decided_at = approver.as_ref().map(|_| Utc::now());

        let timeout_secs = if tool_name == EXECUTE_SHELL_COMMAND {
            ctx.config.timeouts.shell_tool_sec
        } else {
            ctx.config.timeouts.default_tool_sec
        };

        let dispatch = handler.execute_erased(params.clone(), ctx);
        let dispatched = tokio::time::timeout(Duration::from_secs(timeout_secs), dispatch).await;

        let (status, result, notes) = match dispatched {
            Ok(Ok(result)) => {
                let notes = validation::notes_for_result(&result);
                (AuditStatus::Success, result, notes)
            }
            Ok(Err(tool_error)) => (AuditStatus::Error, ToolResult::from(tool_error), Vec::new()),
            Err(_) => (
                AuditStatus::Error,
                ToolResult::from(ToolError::Timeout(tool_name.to_string())),
                Vec::new(),
            ),
        };

        let completed_at = Utc::now();
        let (result_size, result_preview) = AuditRecord::preview(&result.llm_format());

        if let Err(e) = self
            .audit_store
            .append(AuditRecord {
                execution_id: ExecutionId::new(),
                conversation_id,
                tool_name: tool_name.to_string(),
                parameters: params,
                approver,
                status,
                requested_at,
                decided_at,
                completed_at: Some(completed_at),
                result_size,
                result_preview,
            })
            .await
        {
            warn!(error = %e, tool = tool_name, "failed to write audit record");
        }

        Ok(Outcome::Completed { status, result, notes })
    }
}
