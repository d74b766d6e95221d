//! Per-tool parameter validation and result-note scanning: parameter
//! validators run before dispatch and can hard-reject (`Err(InvalidParams)`);
//! result notes run after dispatch and are advisory only.

use serde_json::Value;

use steward_tools::result::ToolResult;
use steward_tools::shell::is_banned_command;
use steward_tools::tools::{EXECUTE_SHELL_COMMAND, KUBECTL_SCALE_DEPLOYMENT};
use steward_tools::ToolError;

/// Advisory observation about a completed tool result, carried in the
/// `AuditRecord` alongside a successful outcome rather than turned into an
/// error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationNote {
    PossibleError(String),
    EmptyResult,
}

pub trait ToolValidator: Send + Sync {
    /// Reject outright before the call ever reaches approval gating.
    fn validate_params(&self, tool_name: &str, params: &Value) -> Result<(), ToolError>;
}

/// Denylist check for `execute_shell_command`, reusing the same regex set
/// the shell executor itself enforces — duplicated here so a banned command
/// is rejected at validation time, before a `strict`-mode approval request
/// is even raised.
pub struct ShellCommandValidator;

impl ToolValidator for ShellCommandValidator {
    fn validate_params(&self, tool_name: &str, params: &Value) -> Result<(), ToolError> {
        if tool_name != EXECUTE_SHELL_COMMAND {
            return Ok(());
        }
        let command = params.get("command").and_then(Value::as_str).unwrap_or_default();
        if is_banned_command(command) {
            return Err(ToolError::invalid_params(
                tool_name,
                format!("command `{command}` is not permitted"),
            ));
        }
        Ok(())
    }
}

/// Rejects a negative replica count before the call ever reaches the
/// approval gate, so a malformed scale request produces `BadParams`
/// immediately rather than suspending for a decision on a call that can
/// never succeed.
pub struct ScaleReplicasValidator;

impl ToolValidator for ScaleReplicasValidator {
    fn validate_params(&self, tool_name: &str, params: &Value) -> Result<(), ToolError> {
        if tool_name != KUBECTL_SCALE_DEPLOYMENT {
            return Ok(());
        }
        match params.get("replicas").and_then(Value::as_i64) {
            Some(replicas) if replicas < 0 => {
                Err(ToolError::invalid_params(tool_name, "replicas must be >= 0"))
            }
            _ => Ok(()),
        }
    }
}

pub struct ValidatorRegistry {
    validators: Vec<Box<dyn ToolValidator>>,
}

impl ValidatorRegistry {
    pub fn standard() -> Self {
        Self {
            validators: vec![Box::new(ShellCommandValidator), Box::new(ScaleReplicasValidator)],
        }
    }

    pub fn validate(&self, tool_name: &str, params: &Value) -> Result<(), ToolError> {
        for validator in &self.validators {
            validator.validate_params(tool_name, params)?;
        }
        Ok(())
    }
}

/// Substrings that, if present in a result's rendered text, suggest the
/// tool call nominally succeeded but the underlying operation did not.
const ERROR_SUBSTRINGS: &[&str] = &[
    "error",
    "failed",
    "exception",
    "not found",
    "forbidden",
    "timeout",
];

/// Step 6 of the Execution Engine contract: scan a completed result for
/// substrings suggesting it failed silently, and flag an empty payload.
pub fn notes_for_result(result: &ToolResult) -> Vec<ValidationNote> {
    let mut notes = Vec::new();
    let rendered = result.llm_format();
    let lower = rendered.to_lowercase();

    for needle in ERROR_SUBSTRINGS {
        if lower.contains(needle) {
            notes.push(ValidationNote::PossibleError((*needle).to_string()));
        }
    }
    if result.is_empty_payload() {
        notes.push(ValidationNote::EmptyResult);
    }
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_banned_shell_command() {
        let registry = ValidatorRegistry::standard();
        let err = registry
            .validate(EXECUTE_SHELL_COMMAND, &json!({ "command": "curl http://evil", "shell": "sh" }))
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams { .. }));
    }

    #[test]
    fn allows_ordinary_shell_command() {
        let registry = ValidatorRegistry::standard();
        assert!(registry
            .validate(EXECUTE_SHELL_COMMAND, &json!({ "command": "kubectl get pods", "shell": "sh" }))
            .is_ok());
    }

    #[test]
    fn ignores_other_tools() {
        let registry = ValidatorRegistry::standard();
        assert!(registry.validate("kubectl_get_pods", &json!({})).is_ok());
    }

    #[test]
    fn rejects_negative_replica_count() {
        let registry = ValidatorRegistry::standard();
        let err = registry
            .validate(KUBECTL_SCALE_DEPLOYMENT, &json!({ "deployment_name": "frontend", "namespace": "production", "replicas": -3 }))
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams { .. }));
    }

    #[test]
    fn allows_non_negative_replica_count() {
        let registry = ValidatorRegistry::standard();
        assert!(registry
            .validate(KUBECTL_SCALE_DEPLOYMENT, &json!({ "deployment_name": "frontend", "namespace": "production", "replicas": 5 }))
            .is_ok());
    }
}
