use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure taxonomy shared across every executor. Mirrors the shape of the
/// engine's own error enum so a `ToolError` can be carried inside a
/// `ToolResult::Error` without losing the variant the caller needs to branch
/// on.
#[derive(Error, Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid parameters for {tool_name}: {message}")]
    InvalidParams { tool_name: String, message: String },

    #[error("{0}")]
    Execution(ToolExecutionError),

    #[error("{0} was cancelled")]
    Cancelled(String),

    #[error("{0} timed out")]
    Timeout(String),

    #[error("{0} requires approval to run")]
    DeniedByUser(String),

    #[error("{0} denied by approval policy")]
    DeniedByPolicy(String),

    #[error("unexpected error: {0}")]
    InternalError(String),
}

impl ToolError {
    pub fn invalid_params<T: Into<String>, M: Into<String>>(tool_name: T, message: M) -> Self {
        ToolError::InvalidParams {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }
}

/// Per-executor detail, tagged by which executor produced it.
#[derive(Error, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "executor", content = "error", rename_all = "snake_case")]
pub enum ToolExecutionError {
    #[error("{0}")]
    Kubernetes(KubernetesError),
    #[error("{0}")]
    Shell(ShellError),
    #[error("{0}")]
    Analytics(AnalyticsError),
}

/// Errors surfaced by the Kubernetes executor.
#[derive(Error, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum KubernetesError {
    #[error("cluster API unreachable: {detail}")]
    Unreachable { detail: String },

    #[error("{status}: {detail}")]
    ApiError { status: u16, detail: String },

    #[error("{resource} {name} not found in namespace {namespace}")]
    NotFound {
        resource: String,
        namespace: String,
        name: String,
    },

    #[error("metrics API not available on this cluster")]
    MetricsUnavailable,
}

/// Errors surfaced by the shell executor.
#[derive(Error, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ShellError {
    #[error("command is not permitted: {command}")]
    DisallowedCommand { command: String },

    #[error("failed to spawn process: {message}")]
    Spawn { message: String },

    #[error("io error communicating with child process: {message}")]
    Io { message: String },
}

/// Errors surfaced by derived analytics executors.
#[derive(Error, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum AnalyticsError {
    #[error("insufficient metric history for {pod} in {namespace} ({samples} sample(s))")]
    InsufficientHistory {
        namespace: String,
        pod: String,
        samples: usize,
    },
}
