use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::Mutex;

use crate::config::ModelId;
use steward_tools::ToolSchema;

use super::{CompletionResponse, ContentBlock, Message, Provider, ProviderError, TokenUsage};

/// Deterministic test double: replays a queue of scripted responses, one
/// per `complete()` call. Falls back to a terminal text turn echoing the
/// last user message once the queue drains. Used by driver/scenario tests
/// that must never touch the network.
pub struct EchoProvider {
    script: Mutex<VecDeque<CompletionResponse>>,
}

impl EchoProvider {
    pub fn new(script: Vec<CompletionResponse>) -> Self {
        Self {
            script: Mutex::new(script.into()),
        }
    }

    pub fn text(content: impl Into<String>) -> CompletionResponse {
        CompletionResponse {
            content: vec![ContentBlock::Text(content.into())],
            usage: TokenUsage::default(),
        }
    }

    pub fn tool_use(id: impl Into<String>, name: impl Into<String>, input: serde_json::Value) -> CompletionResponse {
        CompletionResponse {
            content: vec![ContentBlock::ToolUse {
                id: id.into(),
                name: name.into(),
                input,
            }],
            usage: TokenUsage::default(),
        }
    }
}

#[async_trait]
impl Provider for EchoProvider {
    async fn complete(
        &self,
        _model: &ModelId,
        _system: &str,
        messages: &[Message],
        _tools: &[ToolSchema],
    ) -> Result<CompletionResponse, ProviderError> {
        if let Some(next) = self.script.lock().await.pop_front() {
            return Ok(next);
        }

        let last_user_text = messages
            .iter()
            .rev()
            .find_map(|m| {
                m.content.iter().find_map(|b| match b {
                    ContentBlock::Text(t) => Some(t.clone()),
                    _ => None,
                })
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content: vec![ContentBlock::Text(format!("echo: {last_user_text}"))],
            usage: TokenUsage::default(),
        })
    }
}

/// Always fails with `Unreachable`, for testing the Driver's retry-then-fail
/// path (§7's "one retry with jittered 500ms backoff").
pub struct NullProvider;

#[async_trait]
impl Provider for NullProvider {
    async fn complete(
        &self,
        _model: &ModelId,
        _system: &str,
        _messages: &[Message],
        _tools: &[ToolSchema],
    ) -> Result<CompletionResponse, ProviderError> {
        Err(ProviderError::Unreachable("no provider configured".to_string()))
    }
}
