use thiserror::Error;

use crate::domain::ExecutionId;

/// Crate-wide error taxonomy, returned directly from `Engine` methods.
/// Infrastructure-level variants (`ConversationBusy`, `AlreadyDecided`,
/// `Unreachable`) escape to the caller without a Turn being appended;
/// tool-level failures are instead packaged as `ToolResult::Error` turns
/// and never reach this enum.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Tool(#[from] steward_tools::ToolError),

    #[error("unknown model: {0}")]
    BadModel(String),

    #[error("conversation {0} not found")]
    ConversationNotFound(crate::domain::ConversationId),

    #[error("conversation is busy processing another message")]
    ConversationBusy,

    #[error("execution {0} already decided")]
    AlreadyDecided(ExecutionId),

    #[error("pending execution {0} not found")]
    PendingNotFound(ExecutionId),

    #[error("LLM endpoint unreachable: {0}")]
    Unreachable(String),

    #[error(transparent)]
    Store(#[from] sqlx::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
