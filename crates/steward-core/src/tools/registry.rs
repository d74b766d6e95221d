use std::collections::HashMap;
use std::sync::Arc;

use steward_tools::{Classification, ToolError, ToolSchema};

use super::context::ToolContext;
use super::handler::ToolHandler;
use crate::analytics::executor as analytics_executor;
use crate::executors::kubernetes as k8s_executor;
use crate::executors::shell as shell_executor;

/// Maps catalog name -> type-erased handler. Extensibility story per spec
/// §4.4: a new Executor registers by providing a catalog entry and a
/// handler; the Engine requires no other change.
pub struct Registry {
    handlers: HashMap<&'static str, Arc<dyn ToolHandler>>,
}

impl Registry {
    /// The full tool catalog this engine ships with.
    pub fn standard() -> Self {
        let mut handlers: HashMap<&'static str, Arc<dyn ToolHandler>> = HashMap::new();

        handlers.insert(steward_tools::tools::KUBECTL_GET_PODS, Arc::new(k8s_executor::GetPodsTool));
        handlers.insert(steward_tools::tools::KUBECTL_GET_POD_LOGS, Arc::new(k8s_executor::GetPodLogsTool));
        handlers.insert(steward_tools::tools::KUBECTL_DESCRIBE_POD, Arc::new(k8s_executor::DescribePodTool));
        handlers.insert(steward_tools::tools::KUBECTL_GET_DEPLOYMENTS, Arc::new(k8s_executor::GetDeploymentsTool));
        handlers.insert(steward_tools::tools::KUBECTL_GET_EVENTS, Arc::new(k8s_executor::GetEventsTool));
        handlers.insert(steward_tools::tools::KUBECTL_TOP_PODS, Arc::new(k8s_executor::TopPodsTool));
        handlers.insert(steward_tools::tools::KUBECTL_SCALE_DEPLOYMENT, Arc::new(k8s_executor::ScaleDeploymentTool));
        handlers.insert(steward_tools::tools::KUBECTL_DELETE_POD, Arc::new(k8s_executor::DeletePodTool));

        handlers.insert(steward_tools::tools::ANALYZE_RESOURCE_EFFICIENCY, Arc::new(analytics_executor::ResourceEfficiencyTool));
        handlers.insert(steward_tools::tools::AUTO_RESTART_POD, Arc::new(k8s_executor::AutoRestartPodTool));
        handlers.insert(steward_tools::tools::AUTO_SCALE_IF_NEEDED, Arc::new(k8s_executor::AutoScaleIfNeededTool));
        handlers.insert(steward_tools::tools::PREDICT_RESOURCE_EXHAUSTION, Arc::new(analytics_executor::PredictResourceExhaustionTool));
        handlers.insert(steward_tools::tools::SUGGEST_PREEMPTIVE_ACTIONS, Arc::new(analytics_executor::SuggestPreemptiveActionsTool));
        handlers.insert(steward_tools::tools::IDENTIFY_FAILURE_PATTERNS, Arc::new(analytics_executor::IdentifyFailurePatternsTool));
        handlers.insert(steward_tools::tools::PREDICT_SCALING_NEEDS, Arc::new(analytics_executor::PredictScalingNeedsTool));
        handlers.insert(steward_tools::tools::SCAN_POD_SECURITY, Arc::new(analytics_executor::ScanPodSecurityTool));
        handlers.insert(steward_tools::tools::AUTO_FIX_SECURITY_ISSUE, Arc::new(k8s_executor::AutoFixSecurityIssueTool));

        handlers.insert(steward_tools::tools::EXECUTE_SHELL_COMMAND, Arc::new(shell_executor::ExecuteShellCommandTool));

        Self { handlers }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.handlers.get(name).cloned()
    }

    pub fn classification(&self, name: &str) -> Result<Classification, ToolError> {
        self.handlers
            .get(name)
            .map(|h| h.schema().classification)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    pub fn schemas(&self) -> Vec<ToolSchema> {
        let mut names: Vec<&&'static str> = self.handlers.keys().collect();
        names.sort();
        names.into_iter().map(|n| self.handlers[n].schema()).collect()
    }

    pub async fn dispatch(
        &self,
        name: &str,
        params: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<steward_tools::ToolResult, ToolError> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        handler.execute_erased(params, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_covers_every_catalog_name() {
        let registry = Registry::standard();
        for name in steward_tools::tools::ALL_TOOL_NAMES {
            assert!(registry.get(name).is_some(), "missing handler for {name}");
        }
    }
}
