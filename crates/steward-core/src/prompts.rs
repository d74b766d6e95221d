//! Fixed system prompt and the small per-model-family registry that adjusts
//! its phrasing.

use crate::config::ModelId;

const BASE_PROMPT: &str = "\
You are an operations agent with tool access to a Kubernetes cluster and a host shell. \
Make incremental progress: before calling a tool, write a brief <think> block explaining \
why, and when multiple steps are needed, a <plan> block outlining them. Prefer one tool \
call per turn so each result can inform the next step; you may emit more than one, but \
they will be executed strictly in the order you give them. After every tool result, either \
call another tool or produce a final answer — never stop mid-task silently. Some tool calls \
will pause for human approval; when that happens, stop and wait, you will be re-invoked with \
the decision.";

/// Builds the system prompt for a given model, applying small per-family
/// phrasing adjustments.
pub fn system_prompt(model: &ModelId, override_text: Option<&str>) -> String {
    if let Some(text) = override_text {
        return text.to_string();
    }

    match (model.provider.as_str(), model.id.as_str()) {
        ("anthropic", id) if id.starts_with("claude-3-5") => {
            format!("{BASE_PROMPT}\n\nBe concise in your final answers; the user can ask follow-up questions.")
        }
        _ => BASE_PROMPT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_builtin_prompt() {
        let model = ModelId::parse("anthropic/claude-3-5-sonnet").unwrap();
        assert_eq!(system_prompt(&model, Some("custom")), "custom");
    }

    #[test]
    fn builtin_prompt_declares_think_and_plan_markers() {
        let model = ModelId::parse("echo/test").unwrap();
        let prompt = system_prompt(&model, None);
        assert!(prompt.contains("<think>"));
        assert!(prompt.contains("<plan>"));
    }
}
