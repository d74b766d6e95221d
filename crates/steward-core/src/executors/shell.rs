//! Thin adapter: the catalog entry's approval/dispatch plumbing around the
//! process-spawning primitive that lives in `steward-tools` (it has no
//! cluster dependency, so it stays out of this crate).

use std::time::Duration;

use async_trait::async_trait;

use steward_tools::shell::{run_shell_command, ShellKind};
use steward_tools::tools::shell_tool::{ExecuteShellCommandParams, ShellParam};
use steward_tools::{Classification, ToolError, ToolGroup};

use crate::tools::{CatalogTool, ToolContext};

fn wrap_shell_error(error: steward_tools::error::ShellError) -> ToolError {
    ToolError::Execution(steward_tools::error::ToolExecutionError::Shell(error))
}

pub struct ExecuteShellCommandTool;

#[async_trait]
impl CatalogTool for ExecuteShellCommandTool {
    type Params = ExecuteShellCommandParams;
    const NAME: &'static str = steward_tools::tools::EXECUTE_SHELL_COMMAND;
    const DISPLAY_NAME: &'static str = "Execute shell command";
    const DESCRIPTION: &'static str = "Run a shell command on the operator host, outside the cluster API.";
    const CLASSIFICATION: Classification = Classification::Dangerous;
    const GROUP: ToolGroup = ToolGroup::Shell;

    async fn execute(&self, params: Self::Params, ctx: &ToolContext) -> Result<steward_tools::ToolResult, ToolError> {
        let kind = match params.shell {
            ShellParam::Sh => ShellKind::Sh,
            ShellParam::Cmd => ShellKind::Cmd,
            ShellParam::Powershell => ShellKind::PowerShell,
        };

        let cap = ctx.config.timeouts.shell_tool_sec;
        let timeout_sec = u64::from(params.timeout_sec).min(cap);

        let result = run_shell_command(
            &params.command,
            kind,
            Duration::from_secs(timeout_sec),
            ctx.cancellation_token.clone(),
        )
        .await
        .map_err(wrap_shell_error)?;

        Ok(result.into())
    }
}
