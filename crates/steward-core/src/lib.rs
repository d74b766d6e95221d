//! Core engine crate: conversation driver, execution engine, Kubernetes and
//! analytics executors, approval and storage layers.

pub mod analytics;
pub mod approval;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod executors;
pub mod llm;
pub mod prompts;
pub mod store;
pub mod tools;
pub mod validation;

pub use domain::{Conversation, ConversationId, ExecutionId, PendingExecution, ToolCallId, TurnId};
pub use engine::{ChatOptions, ChatOutcome, Engine};
pub use error::{Error, Result};
