//! Self-contained process-spawning executor with no dependency on the
//! cluster, kept in this crate alongside the rest of the tool vocabulary
//! rather than the core engine crate.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::error::ShellError;
use crate::result::ShellResult;

/// Commands that never reach even `strict`-mode approval gating: network
/// fetchers, privilege escalation, interactive editors, and other
/// state-changing shell builtins, narrowed to what's relevant on a shared
/// operator host rather than a developer workstation.
static BANNED_COMMAND_REGEXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    let banned = [
        "curl", "wget", "nc", "telnet", "ssh", "scp", "ftp", "sftp", "sudo", "su", "chown",
        "chmod", "useradd", "userdel", "groupadd", "groupdel", "vi", "vim", "nano", "pico",
        "emacs", "ed", "mkfs", "dd", "reboot", "shutdown", "halt",
    ];

    banned
        .iter()
        .map(|cmd| {
            Regex::new(&format!(r"(^|[;&|\n`]|\$\(|\bsh\s+-c\s+['""]?)\s*(\S*/)?{}\b", regex::escape(cmd)))
                .expect("banned command regex compiles")
        })
        .collect()
});

pub fn is_banned_command(command: &str) -> bool {
    BANNED_COMMAND_REGEXES.iter().any(|re| re.is_match(command))
}

/// Which interpreter to run the command through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKind {
    Sh,
    Cmd,
    PowerShell,
}

impl ShellKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sh" => Some(Self::Sh),
            "cmd" => Some(Self::Cmd),
            "powershell" => Some(Self::PowerShell),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShellKind::Sh => "sh",
            ShellKind::Cmd => "cmd",
            ShellKind::PowerShell => "powershell",
        }
    }

    fn program_and_arg(self) -> (&'static str, &'static str) {
        match self {
            ShellKind::Sh => ("/bin/sh", "-c"),
            ShellKind::Cmd => ("cmd", "/C"),
            ShellKind::PowerShell => ("powershell", "-Command"),
        }
    }
}

/// Run `command` through `shell`, enforcing `timeout` and racing
/// `cancel`. Never inherits the parent's stdin — no interactive session.
pub async fn run_shell_command(
    command: &str,
    shell: ShellKind,
    timeout_duration: Duration,
    cancel: CancellationToken,
) -> Result<ShellResult, ShellError> {
    if is_banned_command(command) {
        return Err(ShellError::DisallowedCommand {
            command: command.to_string(),
        });
    }

    tokio::select! {
        _ = cancel.cancelled() => Err(ShellError::Io { message: "cancelled".to_string() }),
        res = timeout(timeout_duration, spawn_and_wait(command, shell, cancel.clone())) => {
            match res {
                Ok(result) => result,
                Err(_) => Err(ShellError::Io { message: "timed out".to_string() }),
            }
        }
    }
}

async fn spawn_and_wait(
    command: &str,
    shell: ShellKind,
    cancel: CancellationToken,
) -> Result<ShellResult, ShellError> {
    let (program, flag) = shell.program_and_arg();

    let mut cmd = Command::new(program);
    cmd.arg(flag)
        .arg(command)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .map_err(|e| ShellError::Spawn { message: e.to_string() })?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| ShellError::Io { message: "failed to capture stdout".to_string() })?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| ShellError::Io { message: "failed to capture stderr".to_string() })?;

    let stdout_handle = tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf).await.map(|_| buf)
    });
    let stderr_handle = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr.read_to_end(&mut buf).await.map(|_| buf)
    });

    tokio::select! {
        _ = cancel.cancelled() => {
            let _ = child.kill().await;
            stdout_handle.abort();
            stderr_handle.abort();
            Err(ShellError::Io { message: "cancelled".to_string() })
        }
        status = child.wait() => {
            let status = status.map_err(|e| ShellError::Io { message: e.to_string() })?;
            let (stdout_bytes, stderr_bytes) = tokio::try_join!(stdout_handle, stderr_handle)
                .map_err(|e| ShellError::Io { message: format!("failed to join read tasks: {e}") })?;
            let stdout = String::from_utf8_lossy(&stdout_bytes.map_err(|e| ShellError::Io { message: e.to_string() })?).to_string();
            let stderr = String::from_utf8_lossy(&stderr_bytes.map_err(|e| ShellError::Io { message: e.to_string() })?).to_string();

            Ok(ShellResult {
                command: command.to_string(),
                shell: shell.as_str().to_string(),
                stdout,
                stderr,
                exit_code: status.code().unwrap_or(-1),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_banned_commands() {
        assert!(is_banned_command("curl https://example.com"));
        assert!(is_banned_command("sudo rm -rf /"));
        assert!(!is_banned_command("kubectl get pods"));
    }

    #[tokio::test]
    async fn runs_a_simple_command() {
        let result = run_shell_command(
            "echo hello",
            ShellKind::Sh,
            Duration::from_secs(5),
            CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(result.stdout.trim(), "hello");
        assert_eq!(result.exit_code, 0);
    }

    #[tokio::test]
    async fn rejects_banned_command_before_spawning() {
        let result = run_shell_command(
            "wget http://example.com",
            ShellKind::Sh,
            Duration::from_secs(5),
            CancellationToken::new(),
        )
        .await;
        assert!(matches!(result, Err(ShellError::DisallowedCommand { .. })));
    }
}
