use clap::{Parser, Subcommand};

/// Command-line front end for the Steward Kubernetes operations agent.
/// One subcommand per operator action; see DESIGN.md for the command tree's provenance.
#[derive(Debug, Parser)]
#[command(name = "steward", version, about)]
pub struct Cli {
    /// Path to a TOML config file. Defaults not found -> built-in defaults.
    #[arg(long, global = true, default_value = "steward.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Send a message, optionally continuing an existing conversation.
    Chat {
        /// Existing conversation id to continue; omit to start a new one.
        #[arg(long)]
        session: Option<String>,
        /// The user message text.
        message: String,
        /// `provider/model`, e.g. `anthropic/claude-3-5-sonnet`.
        #[arg(long, default_value = "anthropic/claude-3-5-sonnet")]
        model: String,
        /// Overrides the conversation's configured approval mode for this turn.
        #[arg(long, value_enum)]
        approval: Option<ApprovalModeArg>,
    },
    /// Approve a suspended tool call and resume the conversation.
    Approve {
        execution_id: String,
        #[arg(long, default_value = "cli-user")]
        approver: String,
        #[arg(long, default_value = "anthropic/claude-3-5-sonnet")]
        model: String,
        /// Remember this exact tool for the rest of the conversation.
        #[arg(long)]
        remember_tool: bool,
        /// Remember this shell command prefix for the rest of the conversation.
        #[arg(long)]
        remember_shell_pattern: Option<String>,
    },
    /// Reject a suspended tool call and resume the conversation.
    Reject {
        execution_id: String,
        #[arg(long, default_value = "cli-user")]
        approver: String,
        #[arg(long, default_value = "anthropic/claude-3-5-sonnet")]
        model: String,
    },
    /// Conversation management.
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },
    /// Inspect suspended tool calls awaiting a decision.
    Pending {
        #[command(subcommand)]
        action: PendingAction,
    },
    /// Inspect the audit log of completed and rejected tool calls.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Inspect the tool catalog.
    Tools {
        #[command(subcommand)]
        action: ToolsAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum SessionsAction {
    List,
    Show { id: String },
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum PendingAction {
    List,
}

#[derive(Debug, Subcommand)]
pub enum HistoryAction {
    List {
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
}

#[derive(Debug, Subcommand)]
pub enum ToolsAction {
    List,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ApprovalModeArg {
    Strict,
    Normal,
    Auto,
}

impl From<ApprovalModeArg> for steward_core::approval::ApprovalMode {
    fn from(value: ApprovalModeArg) -> Self {
        match value {
            ApprovalModeArg::Strict => steward_core::approval::ApprovalMode::Strict,
            ApprovalModeArg::Normal => steward_core::approval::ApprovalMode::Normal,
            ApprovalModeArg::Auto => steward_core::approval::ApprovalMode::Auto,
        }
    }
}
