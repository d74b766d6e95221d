//! The conversation-to-tool loop: one user message in, a terminal assistant
//! reply or a suspended pending execution out.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use tracing::{info, warn};

use steward_tools::{ToolCall, ToolResult, ToolSchema};

use crate::approval::ApprovalMode;
use crate::config::ModelId;
use crate::domain::{AuditStatus, Conversation, ConversationId, ExecutionId, ToolCallId, ToolResultStatus, TurnBody};
use crate::error::{Error, Result};
use crate::llm::{ContentBlock, Message, Provider, ProviderError, Role};
use crate::prompts::system_prompt;
use crate::store::ConversationStore;
use crate::tools::ToolContext;

use super::execution_engine::{ExecutionEngine, Outcome};

/// Hard cap on LLM round-trips per `chat()` call.
pub const MAX_ITERATIONS: u32 = 16;

#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub approval_mode: ApprovalMode,
    pub model: ModelId,
    pub system_prompt_override: Option<String>,
}

/// Result of one `chat()` call: a terminal reply, or a halted loop awaiting
/// a human decision on `pending_execution`.
pub struct ChatOutcome {
    pub conversation_id: ConversationId,
    pub response_text: Option<String>,
    pub tool_uses: Vec<ToolCall>,
    pub tool_results: Vec<ToolResult>,
    pub pending_execution: Option<ExecutionId>,
}

pub struct ConversationDriver {
    conversation_store: Arc<dyn ConversationStore>,
    execution_engine: Arc<ExecutionEngine>,
    provider: Arc<dyn Provider>,
    tool_schemas: Vec<ToolSchema>,
}

impl ConversationDriver {
    pub fn new(
        conversation_store: Arc<dyn ConversationStore>,
        execution_engine: Arc<ExecutionEngine>,
        provider: Arc<dyn Provider>,
        tool_schemas: Vec<ToolSchema>,
    ) -> Self {
        Self {
            conversation_store,
            execution_engine,
            provider,
            tool_schemas,
        }
    }

    pub async fn chat(
        &self,
        conversation_id: Option<ConversationId>,
        user_text: &str,
        options: &ChatOptions,
        ctx: &ToolContext,
    ) -> Result<ChatOutcome> {
        let now = Utc::now();
        let mut conversation = match conversation_id {
            Some(id) => self
                .conversation_store
                .load(id)
                .await?
                .ok_or(Error::ConversationNotFound(id))?,
            None => Conversation::new(ConversationId::new(), crate::domain::derive_title(user_text), now),
        };

        let is_first_message = conversation.turns.is_empty();
        if is_first_message {
            conversation.title = crate::domain::derive_title(user_text);
        }
        let since = conversation.turns.len();
        conversation.push(TurnBody::User { text: user_text.to_string() }, now);

        let outcome = self.run_loop(&mut conversation, since, options, ctx).await?;
        self.conversation_store.save(&conversation).await?;
        Ok(outcome)
    }

    /// Re-enters the loop after an approval decision has already replaced
    /// the synthetic `approval_required` ToolResult turn in `conversation`.
    /// `since` is the index of that replaced turn, so the returned
    /// `ChatOutcome` reflects only what this decision produced rather than
    /// the whole conversation's history.
    pub async fn resume(
        &self,
        mut conversation: Conversation,
        since: usize,
        options: &ChatOptions,
        ctx: &ToolContext,
    ) -> Result<ChatOutcome> {
        let outcome = self.run_loop(&mut conversation, since, options, ctx).await?;
        self.conversation_store.save(&conversation).await?;
        Ok(outcome)
    }

    async fn run_loop(
        &self,
        conversation: &mut Conversation,
        since: usize,
        options: &ChatOptions,
        ctx: &ToolContext,
    ) -> Result<ChatOutcome> {
        let turn_cap = Duration::from_secs(ctx.config.timeouts.turn_cap_sec);
        let deadline = tokio::time::Instant::now() + turn_cap;
        let system = system_prompt(&options.model, options.system_prompt_override.as_deref());

        for iteration in 0..MAX_ITERATIONS {
            if tokio::time::Instant::now() >= deadline {
                let now = Utc::now();
                conversation.push(
                    TurnBody::Assistant {
                        text: Some(format!(
                            "Stopped: the {}-second turn cap was reached.",
                            turn_cap.as_secs()
                        )),
                        tool_calls: Vec::new(),
                    },
                    now,
                );
                return Ok(self.terminal(conversation, since, None));
            }

            let messages = render_messages(conversation);
            let completion = self.invoke_with_retry(&options.model, &system, &messages).await?;

            let tool_uses = completion.tool_uses();
            if tool_uses.is_empty() {
                let now = Utc::now();
                conversation.push(
                    TurnBody::Assistant {
                        text: completion.text(),
                        tool_calls: Vec::new(),
                    },
                    now,
                );
                return Ok(self.terminal(conversation, since, None));
            }

            let tool_calls: Vec<ToolCall> = tool_uses
                .iter()
                .map(|(id, name, input)| ToolCall {
                    id: (*id).to_string(),
                    name: (*name).to_string(),
                    parameters: (*input).clone(),
                })
                .collect();

            let now = Utc::now();
            conversation.push(
                TurnBody::Assistant {
                    text: completion.text(),
                    tool_calls: tool_calls.clone(),
                },
                now,
            );

            for call in &tool_calls {
                let call_id = ToolCallId::new();
                let outcome = self
                    .execution_engine
                    .execute(&call.name, call_id, call.parameters.clone(), conversation, options.approval_mode, ctx)
                    .await;

                match outcome {
                    Ok(Outcome::Completed { status, result, notes }) => {
                        if !notes.is_empty() {
                            warn!(tool = %call.name, notes = ?notes, "tool result carries validation notes");
                        }
                        let turn_status = match status {
                            AuditStatus::Success => ToolResultStatus::Ok,
                            _ => ToolResultStatus::Error,
                        };
                        let now = Utc::now();
                        conversation.push(
                            TurnBody::ToolResult {
                                call_id: call.id.clone(),
                                status: turn_status,
                                result: Some(result),
                                execution_id: None,
                                reason: None,
                            },
                            now,
                        );
                    }
                    Ok(Outcome::Suspended { execution_id }) => {
                        let now = Utc::now();
                        conversation.push(
                            TurnBody::ToolResult {
                                call_id: call.id.clone(),
                                status: ToolResultStatus::ApprovalRequired,
                                result: None,
                                execution_id: Some(execution_id),
                                reason: None,
                            },
                            now,
                        );
                        return Ok(self.terminal(conversation, since, Some(execution_id)));
                    }
                    Err(Error::Tool(tool_error)) => {
                        let now = Utc::now();
                        conversation.push(
                            TurnBody::ToolResult {
                                call_id: call.id.clone(),
                                status: ToolResultStatus::Error,
                                result: Some(ToolResult::from(tool_error)),
                                execution_id: None,
                                reason: None,
                            },
                            now,
                        );
                    }
                    Err(other) => return Err(other),
                }
            }

            info!(iteration, conversation_id = %conversation.id, "driver iteration complete");
        }

        let now = Utc::now();
        conversation.push(
            TurnBody::Assistant {
                text: Some("Stopped: the 16-turn iteration cap was reached.".to_string()),
                tool_calls: Vec::new(),
            },
            now,
        );
        Ok(self.terminal(conversation, since, None))
    }

    /// One retry with jittered ~500ms backoff on `Unreachable`, per §7.
    async fn invoke_with_retry(
        &self,
        model: &ModelId,
        system: &str,
        messages: &[Message],
    ) -> Result<crate::llm::CompletionResponse> {
        match self.provider.complete(model, system, messages, &self.tool_schemas).await {
            Ok(response) => Ok(response),
            Err(ProviderError::Unreachable(detail)) => {
                let jitter_ms = rand::thread_rng().gen_range(400..600);
                tokio::time::sleep(Duration::from_millis(jitter_ms)).await;
                self.provider
                    .complete(model, system, messages, &self.tool_schemas)
                    .await
                    .map_err(|e| Error::Unreachable(format!("{detail}; retry failed: {e}")))
            }
            Err(ProviderError::ApiError { status, detail }) => {
                Err(Error::Unreachable(format!("provider returned {status}: {detail}")))
            }
        }
    }

    /// Builds the outcome from only the turns at index `since` onward, so a
    /// `chat()`/`resume()` call reports what it produced rather than the
    /// whole conversation's accumulated history.
    fn terminal(&self, conversation: &Conversation, since: usize, pending_execution: Option<ExecutionId>) -> ChatOutcome {
        let mut response_text = None;
        let mut tool_uses = Vec::new();
        let mut tool_results = Vec::new();

        for turn in conversation.turns.iter().skip(since) {
            match &turn.body {
                TurnBody::Assistant { text, tool_calls } => {
                    if let Some(t) = text {
                        response_text = Some(t.clone());
                    }
                    tool_uses.extend(tool_calls.clone());
                }
                TurnBody::ToolResult { result: Some(result), .. } => {
                    tool_results.push(result.clone());
                }
                _ => {}
            }
        }

        ChatOutcome {
            conversation_id: conversation.id,
            response_text,
            tool_uses,
            tool_results,
            pending_execution,
        }
    }
}

fn render_messages(conversation: &Conversation) -> Vec<Message> {
    let mut messages = Vec::new();
    for turn in &conversation.turns {
        match &turn.body {
            TurnBody::User { text } => messages.push(Message::user_text(text.clone())),
            TurnBody::Assistant { text, tool_calls } => {
                let mut content = Vec::new();
                if let Some(t) = text {
                    content.push(ContentBlock::Text(t.clone()));
                }
                for call in tool_calls {
                    content.push(ContentBlock::ToolUse {
                        id: call.id.clone(),
                        name: call.name.clone(),
                        input: call.parameters.clone(),
                    });
                }
                messages.push(Message { role: Role::Assistant, content });
            }
            TurnBody::ToolResult { call_id, status, result, reason, .. } => {
                let text = match (status, result, reason) {
                    (ToolResultStatus::ApprovalRequired, _, _) => "waiting for human approval".to_string(),
                    (_, Some(result), _) => result.llm_format(),
                    (_, None, Some(reason)) => reason.clone(),
                    (_, None, None) => String::new(),
                };
                messages.push(Message {
                    role: Role::User,
                    content: vec![ContentBlock::ToolResult {
                        tool_use_id: call_id.clone(),
                        content: text,
                        is_error: matches!(status, ToolResultStatus::Error),
                    }],
                });
            }
        }
    }
    messages
}
