pub mod conversation_driver;
pub mod execution_engine;

pub use conversation_driver::{ChatOptions, ChatOutcome, ConversationDriver};
pub use execution_engine::{ExecutionEngine, Outcome};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use steward_tools::{ToolResult, ToolSchema};

use crate::analytics::MetricHistory;
use crate::approval::{ApprovalController, ApprovalMode};
use crate::config::{Config, ModelId};
use crate::domain::{
    AuditRecord, AuditStatus, Conversation, ConversationId, ExecutionId, PendingExecution,
    ToolResultStatus, TurnBody,
};
use crate::error::{Error, Result};
use crate::executors::K8sClient;
use crate::llm::Provider;
use crate::store::{AuditStore, ConversationStore, ConversationSummary, PendingStore};
use crate::tools::{Registry, ToolContext};

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Top-level library API: one async method per operation the CLI (or any
/// other caller) needs. A single struct owning every store and service,
/// with the driver loop and approval machinery kept as internal
/// collaborators rather than exposed directly.
pub struct Engine {
    conversation_store: Arc<dyn ConversationStore>,
    pending_store: Arc<dyn PendingStore>,
    audit_store: Arc<dyn AuditStore>,
    approval: ApprovalController,
    execution_engine: Arc<ExecutionEngine>,
    driver: ConversationDriver,
    registry: Arc<Registry>,
    config: Arc<Config>,
    history: Arc<MetricHistory>,
    k8s: Arc<dyn K8sClient>,
    locks: RwLock<HashMap<ConversationId, Arc<Mutex<()>>>>,
    _sweeper: tokio::task::JoinHandle<()>,
}

impl Engine {
    pub fn new(
        config: Arc<Config>,
        conversation_store: Arc<dyn ConversationStore>,
        pending_store: Arc<dyn PendingStore>,
        audit_store: Arc<dyn AuditStore>,
        k8s: Arc<dyn K8sClient>,
        provider: Arc<dyn Provider>,
    ) -> Self {
        let registry = Arc::new(Registry::standard());
        let approval = ApprovalController::new(pending_store.clone());
        let execution_engine = Arc::new(ExecutionEngine::new(registry.clone(), ApprovalController::new(pending_store.clone()), audit_store.clone()));
        let schemas: Vec<ToolSchema> = registry.schemas();
        let driver = ConversationDriver::new(conversation_store.clone(), execution_engine.clone(), provider, schemas);
        let sweeper = crate::store::sweeper::spawn(pending_store.clone(), audit_store.clone(), SWEEP_INTERVAL);

        Self {
            conversation_store,
            pending_store,
            audit_store,
            approval,
            execution_engine,
            driver,
            registry,
            config,
            history: Arc::new(MetricHistory::new()),
            k8s,
            locks: RwLock::new(HashMap::new()),
            _sweeper: sweeper,
        }
    }

    async fn conversation_lock(&self, id: ConversationId) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.read().await.get(&id) {
            return lock.clone();
        }
        let mut locks = self.locks.write().await;
        locks.entry(id).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    fn tool_context(&self) -> ToolContext {
        ToolContext {
            k8s: self.k8s.clone(),
            history: self.history.clone(),
            config: self.config.clone(),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Sends one user message, driving the engine loop until a terminal
    /// assistant reply or a suspended approval. Rejects outright (rather
    /// than queueing) if another call on the same conversation is already
    /// in flight, per the conversation-busy resolution in DESIGN.md.
    pub async fn chat(
        &self,
        conversation_id: Option<ConversationId>,
        user_text: &str,
        model: ModelId,
        approval_mode: Option<ApprovalMode>,
    ) -> Result<ChatOutcome> {
        let lock = match conversation_id {
            Some(id) => self.conversation_lock(id).await,
            None => Arc::new(Mutex::new(())),
        };
        let _guard = lock.try_lock().map_err(|_| Error::ConversationBusy)?;

        let approval_mode = approval_mode.unwrap_or(self.config.approval.default_mode);
        let options = ChatOptions {
            approval_mode,
            model,
            system_prompt_override: None,
        };
        let ctx = self.tool_context();
        self.driver.chat(conversation_id, user_text, &options, &ctx).await
    }

    /// Approves a suspended execution, runs it, and re-enters the driver
    /// loop so the assistant can react to the result in the same turn.
    pub async fn approve(
        &self,
        execution_id: ExecutionId,
        approver: &str,
        remember: Option<crate::domain::ApprovalMemory>,
        model: ModelId,
    ) -> Result<ChatOutcome> {
        let pending = self
            .pending_store
            .get(execution_id)
            .await?
            .ok_or(Error::PendingNotFound(execution_id))?;
        let lock = self.conversation_lock(pending.conversation_id).await;
        let _guard = lock.try_lock().map_err(|_| Error::ConversationBusy)?;

        let mut conversation = self
            .conversation_store
            .load(pending.conversation_id)
            .await?
            .ok_or(Error::ConversationNotFound(pending.conversation_id))?;

        let decided = self.approval.approve(execution_id, approver, remember, &mut conversation).await?;
        let ctx = self.tool_context();
        let outcome = self.execution_engine.run_approved(decided, approver, &ctx).await?;

        let since = self
            .replace_pending_turn(&mut conversation, execution_id, outcome)
            .unwrap_or(conversation.turns.len());

        let options = ChatOptions {
            approval_mode: self.config.approval.default_mode,
            model,
            system_prompt_override: None,
        };
        self.driver.resume(conversation, since, &options, &ctx).await
    }

    /// Rejects a suspended execution: writes an audit record and a
    /// `user_rejected` error ToolResult turn, then re-enters the driver loop
    /// so the assistant can acknowledge the rejection.
    pub async fn reject(&self, execution_id: ExecutionId, approver: &str, model: ModelId) -> Result<ChatOutcome> {
        let pending = self
            .pending_store
            .get(execution_id)
            .await?
            .ok_or(Error::PendingNotFound(execution_id))?;
        let lock = self.conversation_lock(pending.conversation_id).await;
        let _guard = lock.try_lock().map_err(|_| Error::ConversationBusy)?;

        let mut conversation = self
            .conversation_store
            .load(pending.conversation_id)
            .await?
            .ok_or(Error::ConversationNotFound(pending.conversation_id))?;

        let decided = self.approval.reject(execution_id, approver, &mut conversation).await?;

        let now = Utc::now();
        let (size, preview) = AuditRecord::preview("rejected by operator");
        if let Err(e) = self
            .audit_store
            .append(AuditRecord {
                execution_id: ExecutionId::new(),
                conversation_id: decided.conversation_id,
                tool_name: decided.tool_name.clone(),
                parameters: decided.parameters.clone(),
                approver: Some(approver.to_string()),
                status: AuditStatus::Rejected,
                requested_at: decided.created_at,
                decided_at: Some(now),
                completed_at: Some(now),
                result_size: size,
                result_preview: preview,
            })
            .await
        {
            tracing::warn!(error = %e, "failed to audit rejected execution");
        }

        let call_id = decided.call_id.to_string();
        let since = replace_call_result(
            &mut conversation,
            &call_id,
            TurnBody::ToolResult {
                call_id: decided.call_id.to_string(),
                status: ToolResultStatus::Error,
                result: Some(ToolResult::from(steward_tools::ToolError::invalid_params(
                    decided.tool_name.as_str(),
                    "user_rejected",
                ))),
                execution_id: Some(execution_id),
                reason: Some("user_rejected".to_string()),
            },
            now,
        )
        .unwrap_or(conversation.turns.len());

        let options = ChatOptions {
            approval_mode: self.config.approval.default_mode,
            model,
            system_prompt_override: None,
        };
        let ctx = self.tool_context();
        self.driver.resume(conversation, since, &options, &ctx).await
    }

    /// Swaps the synthetic `approval_required` ToolResult turn raised when
    /// the call suspended for the real outcome of running it. Returns the
    /// index of the replaced turn, so the caller can report `ChatOutcome`
    /// starting there rather than from the whole conversation's history.
    fn replace_pending_turn(&self, conversation: &mut Conversation, execution_id: ExecutionId, outcome: Outcome) -> Option<usize> {
        let now = Utc::now();
        let (turn_status, result) = match outcome {
            Outcome::Completed { status, result, notes } => {
                if !notes.is_empty() {
                    tracing::warn!(notes = ?notes, "approved tool result carries validation notes");
                }
                let turn_status = match status {
                    AuditStatus::Success => ToolResultStatus::Ok,
                    _ => ToolResultStatus::Error,
                };
                (turn_status, result)
            }
            // An approved call is never re-suspended; `run_approved` only
            // ever dispatches it directly.
            Outcome::Suspended { .. } => return None,
        };

        let call_id = call_id_for_execution(conversation, execution_id)?;
        replace_call_result(
            conversation,
            &call_id.clone(),
            TurnBody::ToolResult {
                call_id,
                status: turn_status,
                result: Some(result),
                execution_id: None,
                reason: None,
            },
            now,
        )
    }

    pub async fn list_conversations(&self) -> Result<Vec<ConversationSummary>> {
        self.conversation_store.list().await
    }

    pub async fn load_conversation(&self, id: ConversationId) -> Result<Option<Conversation>> {
        self.conversation_store.load(id).await
    }

    pub async fn delete_conversation(&self, id: ConversationId) -> Result<()> {
        self.conversation_store.delete(id).await
    }

    pub async fn list_pending(&self) -> Result<Vec<PendingExecution>> {
        self.pending_store.list_pending().await
    }

    pub async fn list_history(&self, limit: usize) -> Result<Vec<AuditRecord>> {
        self.audit_store.list(limit).await
    }

    pub fn list_tools(&self) -> Vec<ToolSchema> {
        self.registry.schemas()
    }
}

/// Finds the `ToolResult` turn whose `call_id` matches `call_id` and
/// overwrites it in place, preserving turn ordering and sequence numbers.
fn replace_call_result(conversation: &mut Conversation, call_id: &str, body: TurnBody, now: chrono::DateTime<Utc>) -> Option<usize> {
    let index = conversation
        .turns
        .iter()
        .position(|t| matches!(&t.body, TurnBody::ToolResult { call_id: existing, .. } if existing == call_id));
    if let Some(index) = index {
        conversation.turns[index].body = body;
        conversation.turns[index].created_at = now;
    }
    conversation.last_updated = now;
    index
}

/// The `call_id` of the `ToolResult` turn that suspended as `execution_id`,
/// so the real outcome can be swapped in once a human decides it.
fn call_id_for_execution(conversation: &Conversation, execution_id: ExecutionId) -> Option<String> {
    conversation.turns.iter().find_map(|t| match &t.body {
        TurnBody::ToolResult { execution_id: Some(id), call_id, .. } if *id == execution_id => Some(call_id.clone()),
        _ => None,
    })
}
