use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use comfy_table::Table;

use steward_core::approval::ApprovalMode;
use steward_core::config::ModelId;
use steward_core::domain::{ApprovalMemory, ConversationId, ExecutionId};
use steward_core::{ChatOutcome, Engine};

use crate::cli::args::{Commands, HistoryAction, PendingAction, SessionsAction, ToolsAction};

pub async fn dispatch(engine: &Engine, command: Commands) -> Result<()> {
    match command {
        Commands::Chat { session, message, model, approval } => {
            let session_id = session.map(|s| ConversationId::from_str(&s)).transpose().context("invalid session id")?;
            let model = ModelId::parse(&model).map_err(|e| anyhow!(e))?;
            let outcome = engine
                .chat(session_id, &message, model, approval.map(Into::into))
                .await
                .map_err(|e| anyhow!(e))?;
            print_chat_outcome(&outcome);
        }
        Commands::Approve { execution_id, approver, model, remember_tool, remember_shell_pattern } => {
            let execution_id = parse_execution_id(&execution_id)?;
            let model = ModelId::parse(&model).map_err(|e| anyhow!(e))?;
            let remember = if let Some(pattern) = remember_shell_pattern {
                Some(ApprovalMemory::ShellPattern(pattern))
            } else if remember_tool {
                let pending = engine.list_pending().await.map_err(|e| anyhow!(e))?;
                let tool_name = pending
                    .into_iter()
                    .find(|p| p.execution_id == execution_id)
                    .map(|p| p.tool_name)
                    .ok_or_else(|| anyhow!("no pending execution {execution_id}"))?;
                Some(ApprovalMemory::Tool(tool_name))
            } else {
                None
            };
            let outcome = engine
                .approve(execution_id, &approver, remember, model)
                .await
                .map_err(|e| anyhow!(e))?;
            print_chat_outcome(&outcome);
        }
        Commands::Reject { execution_id, approver, model } => {
            let execution_id = parse_execution_id(&execution_id)?;
            let model = ModelId::parse(&model).map_err(|e| anyhow!(e))?;
            let outcome = engine.reject(execution_id, &approver, model).await.map_err(|e| anyhow!(e))?;
            print_chat_outcome(&outcome);
        }
        Commands::Sessions { action } => match action {
            SessionsAction::List => {
                let summaries = engine.list_conversations().await.map_err(|e| anyhow!(e))?;
                let mut table = Table::new();
                table.set_header(vec!["id", "title", "messages", "last updated"]);
                for s in summaries {
                    table.add_row(vec![s.id.to_string(), s.title, s.message_count.to_string(), s.last_updated.to_rfc3339()]);
                }
                println!("{table}");
            }
            SessionsAction::Show { id } => {
                let id = ConversationId::from_str(&id).context("invalid session id")?;
                let conversation = engine.load_conversation(id).await.map_err(|e| anyhow!(e))?.ok_or_else(|| anyhow!("session {id} not found"))?;
                for turn in &conversation.turns {
                    println!("[{}] {:?}", turn.sequence, turn.body);
                }
            }
            SessionsAction::Delete { id } => {
                let id = ConversationId::from_str(&id).context("invalid session id")?;
                engine.delete_conversation(id).await.map_err(|e| anyhow!(e))?;
                println!("deleted {id}");
            }
        },
        Commands::Pending { action } => match action {
            PendingAction::List => {
                let pending = engine.list_pending().await.map_err(|e| anyhow!(e))?;
                let mut table = Table::new();
                table.set_header(vec!["execution_id", "conversation_id", "tool", "classification", "status"]);
                for p in pending {
                    table.add_row(vec![
                        p.execution_id.to_string(),
                        p.conversation_id.to_string(),
                        p.tool_name,
                        format!("{:?}", p.classification),
                        format!("{:?}", p.status),
                    ]);
                }
                println!("{table}");
            }
        },
        Commands::History { action } => match action {
            HistoryAction::List { limit } => {
                let records = engine.list_history(limit).await.map_err(|e| anyhow!(e))?;
                let mut table = Table::new();
                table.set_header(vec!["execution_id", "tool", "status", "approver", "requested_at"]);
                for r in records {
                    table.add_row(vec![
                        r.execution_id.to_string(),
                        r.tool_name,
                        format!("{:?}", r.status),
                        r.approver.unwrap_or_else(|| "-".to_string()),
                        r.requested_at.to_rfc3339(),
                    ]);
                }
                println!("{table}");
            }
        },
        Commands::Tools { action } => match action {
            ToolsAction::List => {
                let mut table = Table::new();
                table.set_header(vec!["name", "group", "classification", "description"]);
                for schema in engine.list_tools() {
                    table.add_row(vec![
                        schema.name,
                        format!("{:?}", schema.group),
                        format!("{:?}", schema.classification),
                        schema.description,
                    ]);
                }
                println!("{table}");
            }
        },
    }
    Ok(())
}

fn parse_execution_id(raw: &str) -> Result<ExecutionId> {
    ExecutionId::from_str(raw).context("invalid execution id")
}

fn print_chat_outcome(outcome: &ChatOutcome) {
    if let Some(text) = &outcome.response_text {
        println!("{text}");
    }
    if let Some(execution_id) = outcome.pending_execution {
        println!("\n[waiting for approval: {execution_id}]");
    }
    println!("\n(session: {})", outcome.conversation_id);
}
