//! Typed parameter structs for every catalog entry, grouped by executor.

pub mod analytics;
pub mod auto_ops;
pub mod kube_ops;
pub mod shell_tool;

pub const KUBECTL_GET_PODS: &str = "kubectl_get_pods";
pub const KUBECTL_GET_POD_LOGS: &str = "kubectl_get_pod_logs";
pub const KUBECTL_DESCRIBE_POD: &str = "kubectl_describe_pod";
pub const KUBECTL_GET_DEPLOYMENTS: &str = "kubectl_get_deployments";
pub const KUBECTL_GET_EVENTS: &str = "kubectl_get_events";
pub const KUBECTL_TOP_PODS: &str = "kubectl_top_pods";
pub const KUBECTL_SCALE_DEPLOYMENT: &str = "kubectl_scale_deployment";
pub const KUBECTL_DELETE_POD: &str = "kubectl_delete_pod";

pub const ANALYZE_RESOURCE_EFFICIENCY: &str = "analyze_resource_efficiency";
pub const AUTO_RESTART_POD: &str = "auto_restart_pod";
pub const AUTO_SCALE_IF_NEEDED: &str = "auto_scale_if_needed";
pub const PREDICT_RESOURCE_EXHAUSTION: &str = "predict_resource_exhaustion";
pub const SUGGEST_PREEMPTIVE_ACTIONS: &str = "suggest_preemptive_actions";
pub const IDENTIFY_FAILURE_PATTERNS: &str = "identify_failure_patterns";
pub const PREDICT_SCALING_NEEDS: &str = "predict_scaling_needs";
pub const SCAN_POD_SECURITY: &str = "scan_pod_security";
pub const AUTO_FIX_SECURITY_ISSUE: &str = "auto_fix_security_issue";

pub const EXECUTE_SHELL_COMMAND: &str = "execute_shell_command";

/// Every catalog name, in registry display order.
pub const ALL_TOOL_NAMES: &[&str] = &[
    KUBECTL_GET_PODS,
    KUBECTL_GET_POD_LOGS,
    KUBECTL_DESCRIBE_POD,
    KUBECTL_GET_DEPLOYMENTS,
    KUBECTL_GET_EVENTS,
    KUBECTL_TOP_PODS,
    KUBECTL_SCALE_DEPLOYMENT,
    KUBECTL_DELETE_POD,
    ANALYZE_RESOURCE_EFFICIENCY,
    AUTO_RESTART_POD,
    AUTO_SCALE_IF_NEEDED,
    PREDICT_RESOURCE_EXHAUSTION,
    SUGGEST_PREEMPTIVE_ACTIONS,
    IDENTIFY_FAILURE_PATTERNS,
    PREDICT_SCALING_NEEDS,
    SCAN_POD_SECURITY,
    AUTO_FIX_SECURITY_ISSUE,
    EXECUTE_SHELL_COMMAND,
];
