use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// Core enum for all tool results: one variant per catalog entry's payload
/// shape, plus a terminal error variant shared by every tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ToolResult {
    Pods(PodListResult),
    Logs(PodLogsResult),
    PodDescription(PodDescriptionResult),
    Deployments(DeploymentListResult),
    Events(EventListResult),
    Metrics(PodMetricsResult),
    Scale(ScaleResult),
    Delete(DeleteResult),
    ResourceEfficiency(ResourceEfficiencyReport),
    SecurityScan(SecurityScanReport),
    ResourceExhaustion(ResourceExhaustionReport),
    PreemptiveActions(PreemptiveActionsReport),
    FailurePatterns(FailurePatternReport),
    ScalingNeeds(ScalingNeedsReport),
    SecurityFix(SecurityFixResult),
    Shell(ShellResult),

    Error(ToolError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodSummary {
    pub name: String,
    pub namespace: String,
    pub phase: String,
    pub ready: String,
    pub restarts: i32,
    pub node: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodListResult {
    pub namespace: Option<String>,
    pub pods: Vec<PodSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodLogsResult {
    pub pod: String,
    pub namespace: String,
    pub container: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterEvent {
    pub namespace: String,
    pub involved_object: String,
    pub reason: String,
    pub message: String,
    pub event_type: String,
    pub last_seen: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodDescriptionResult {
    pub pod: PodSummary,
    pub spec_summary: String,
    pub recent_events: Vec<ClusterEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentSummary {
    pub name: String,
    pub namespace: String,
    pub desired_replicas: i32,
    pub ready_replicas: i32,
    pub available_replicas: i32,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentListResult {
    pub namespace: Option<String>,
    pub deployments: Vec<DeploymentSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventListResult {
    pub namespace: Option<String>,
    pub events: Vec<ClusterEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerMetric {
    pub container: String,
    pub cpu_millicores: u64,
    pub memory_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodMetric {
    pub pod: String,
    pub namespace: String,
    pub containers: Vec<ContainerMetric>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodMetricsResult {
    pub namespace: Option<String>,
    pub metrics: Vec<PodMetric>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleResult {
    pub deployment: String,
    pub namespace: String,
    pub previous_replicas: i32,
    pub new_replicas: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResult {
    pub pod: String,
    pub namespace: String,
    pub deleted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningVerdict {
    OverProvisioned,
    Balanced,
    UnderProvisioned,
    NoLimitSet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerEfficiency {
    pub pod: String,
    pub namespace: String,
    pub container: String,
    pub usage_ratio: Option<f64>,
    pub verdict: ProvisioningVerdict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceEfficiencyReport {
    pub namespace: Option<String>,
    pub findings: Vec<ContainerEfficiency>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityIssue {
    RunningAsRoot,
    MissingResourceLimits,
    Privileged,
    DangerousCapabilities,
    HostNetwork,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityFinding {
    pub pod: String,
    pub namespace: String,
    pub container: Option<String>,
    pub issue: SecurityIssue,
    pub severity: Severity,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityScanReport {
    pub namespace: Option<String>,
    pub findings: Vec<SecurityFinding>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionVerdict {
    Stable,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcePrediction {
    pub pod: String,
    pub namespace: String,
    pub resource: String,
    pub trend_pct: f64,
    pub verdict: PredictionVerdict,
    pub samples: usize,
    pub low_confidence: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceExhaustionReport {
    pub namespace: Option<String>,
    pub predictions: Vec<ResourcePrediction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreemptiveActionsReport {
    pub namespace: Option<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailurePattern {
    pub reason: String,
    pub occurrences: u32,
    pub pods: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailurePatternReport {
    pub namespace: Option<String>,
    pub patterns: Vec<FailurePattern>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalingSuggestion {
    pub deployment: String,
    pub namespace: String,
    pub current_replicas: i32,
    pub suggested_replicas: i32,
    pub rationale: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalingNeedsReport {
    pub namespace: Option<String>,
    pub suggestions: Vec<ScalingSuggestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityFixResult {
    pub pod: String,
    pub namespace: String,
    pub issue: SecurityIssue,
    pub patched: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellResult {
    pub command: String,
    pub shell: String,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

macro_rules! impl_from_result {
    ($variant:ident, $ty:ty) => {
        impl From<$ty> for ToolResult {
            fn from(value: $ty) -> Self {
                ToolResult::$variant(value)
            }
        }
    };
}

impl_from_result!(Pods, PodListResult);
impl_from_result!(Logs, PodLogsResult);
impl_from_result!(PodDescription, PodDescriptionResult);
impl_from_result!(Deployments, DeploymentListResult);
impl_from_result!(Events, EventListResult);
impl_from_result!(Metrics, PodMetricsResult);
impl_from_result!(Scale, ScaleResult);
impl_from_result!(Delete, DeleteResult);
impl_from_result!(ResourceEfficiency, ResourceEfficiencyReport);
impl_from_result!(SecurityScan, SecurityScanReport);
impl_from_result!(ResourceExhaustion, ResourceExhaustionReport);
impl_from_result!(PreemptiveActions, PreemptiveActionsReport);
impl_from_result!(FailurePatterns, FailurePatternReport);
impl_from_result!(ScalingNeeds, ScalingNeedsReport);
impl_from_result!(SecurityFix, SecurityFixResult);
impl_from_result!(Shell, ShellResult);

impl From<ToolError> for ToolResult {
    fn from(e: ToolError) -> Self {
        ToolResult::Error(e)
    }
}

impl ToolResult {
    /// Render the payload for re-injection into the LLM's message history.
    pub fn llm_format(&self) -> String {
        match self {
            ToolResult::Pods(r) => {
                if r.pods.is_empty() {
                    "No pods found.".to_string()
                } else {
                    r.pods
                        .iter()
                        .map(|p| {
                            format!(
                                "{}/{}  phase={} ready={} restarts={} node={}",
                                p.namespace,
                                p.name,
                                p.phase,
                                p.ready,
                                p.restarts,
                                p.node.as_deref().unwrap_or("-")
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            ToolResult::Logs(r) => r.content.clone(),
            ToolResult::PodDescription(r) => {
                let mut out = r.spec_summary.clone();
                if !r.recent_events.is_empty() {
                    out.push_str("\n\nRecent events:\n");
                    out.push_str(
                        &r.recent_events
                            .iter()
                            .map(|e| format!("[{}] {}: {}", e.event_type, e.reason, e.message))
                            .collect::<Vec<_>>()
                            .join("\n"),
                    );
                }
                out
            }
            ToolResult::Deployments(r) => {
                if r.deployments.is_empty() {
                    "No deployments found.".to_string()
                } else {
                    r.deployments
                        .iter()
                        .map(|d| {
                            format!(
                                "{}/{}  desired={} ready={} available={}",
                                d.namespace, d.name, d.desired_replicas, d.ready_replicas, d.available_replicas
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            ToolResult::Events(r) => {
                if r.events.is_empty() {
                    "No events found.".to_string()
                } else {
                    r.events
                        .iter()
                        .map(|e| format!("[{}] {} {}: {}", e.event_type, e.involved_object, e.reason, e.message))
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            ToolResult::Metrics(r) => {
                if r.metrics.is_empty() {
                    "No metrics available (metrics-server may be absent).".to_string()
                } else {
                    r.metrics
                        .iter()
                        .map(|m| {
                            let containers = m
                                .containers
                                .iter()
                                .map(|c| format!("{}: {}m cpu, {}Mi mem", c.container, c.cpu_millicores, c.memory_bytes / (1024 * 1024)))
                                .collect::<Vec<_>>()
                                .join(", ");
                            format!("{}/{}  {}", m.namespace, m.pod, containers)
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            ToolResult::Scale(r) => format!(
                "Scaled {}/{} from {} to {} replicas.",
                r.namespace, r.deployment, r.previous_replicas, r.new_replicas
            ),
            ToolResult::Delete(r) => {
                if r.deleted {
                    format!("Deleted pod {}/{}.", r.namespace, r.pod)
                } else {
                    format!("Pod {}/{} was not deleted.", r.namespace, r.pod)
                }
            }
            ToolResult::ResourceEfficiency(r) => {
                if r.findings.is_empty() {
                    "No containers to evaluate.".to_string()
                } else {
                    r.findings
                        .iter()
                        .map(|f| {
                            format!(
                                "{}/{} [{}]: {:?}{}",
                                f.namespace,
                                f.pod,
                                f.container,
                                f.verdict,
                                f.usage_ratio
                                    .map(|r| format!(" (usage {:.0}%)", r * 100.0))
                                    .unwrap_or_default()
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            ToolResult::SecurityScan(r) => {
                if r.findings.is_empty() {
                    "No security issues found.".to_string()
                } else {
                    r.findings
                        .iter()
                        .map(|f| {
                            format!(
                                "{}/{} [{}] {:?} ({:?}): {}",
                                f.namespace,
                                f.pod,
                                f.container.as_deref().unwrap_or("pod"),
                                f.issue,
                                f.severity,
                                f.detail
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            ToolResult::ResourceExhaustion(r) => {
                if r.predictions.is_empty() {
                    "No metric history available for prediction.".to_string()
                } else {
                    r.predictions
                        .iter()
                        .map(|p| {
                            let confidence = if p.low_confidence {
                                " (low confidence - insufficient history)"
                            } else {
                                ""
                            };
                            format!(
                                "{}/{} {}: {:?} trend {:+.1}%{}",
                                p.namespace, p.pod, p.resource, p.verdict, p.trend_pct, confidence
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            ToolResult::PreemptiveActions(r) => {
                if r.recommendations.is_empty() {
                    "No preemptive action recommended.".to_string()
                } else {
                    r.recommendations.join("\n")
                }
            }
            ToolResult::FailurePatterns(r) => {
                if r.patterns.is_empty() {
                    "No recurring failure patterns detected.".to_string()
                } else {
                    r.patterns
                        .iter()
                        .map(|p| format!("{} x{} ({})", p.reason, p.occurrences, p.pods.join(", ")))
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            ToolResult::ScalingNeeds(r) => {
                if r.suggestions.is_empty() {
                    "No scaling change suggested.".to_string()
                } else {
                    r.suggestions
                        .iter()
                        .map(|s| {
                            format!(
                                "{}/{}: {} -> {} ({})",
                                s.namespace, s.deployment, s.current_replicas, s.suggested_replicas, s.rationale
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            ToolResult::SecurityFix(r) => {
                if r.patched {
                    format!("Patched {:?} on {}/{}: {}", r.issue, r.namespace, r.pod, r.detail)
                } else {
                    format!("Could not patch {:?} on {}/{}: {}", r.issue, r.namespace, r.pod, r.detail)
                }
            }
            ToolResult::Shell(r) => {
                let mut out = r.stdout.clone();
                if r.exit_code != 0 {
                    if !out.is_empty() && !out.ends_with('\n') {
                        out.push('\n');
                    }
                    out.push_str(&format!("Exit code: {}", r.exit_code));
                }
                if !r.stderr.is_empty() {
                    if !out.is_empty() && !out.ends_with('\n') {
                        out.push('\n');
                    }
                    out.push_str(&format!("stderr:\n{}", r.stderr));
                }
                out
            }
            ToolResult::Error(e) => format!("Error: {e}"),
        }
    }

    /// Variant name for audit-record/metadata purposes.
    pub fn variant_name(&self) -> &'static str {
        match self {
            ToolResult::Pods(_) => "Pods",
            ToolResult::Logs(_) => "Logs",
            ToolResult::PodDescription(_) => "PodDescription",
            ToolResult::Deployments(_) => "Deployments",
            ToolResult::Events(_) => "Events",
            ToolResult::Metrics(_) => "Metrics",
            ToolResult::Scale(_) => "Scale",
            ToolResult::Delete(_) => "Delete",
            ToolResult::ResourceEfficiency(_) => "ResourceEfficiency",
            ToolResult::SecurityScan(_) => "SecurityScan",
            ToolResult::ResourceExhaustion(_) => "ResourceExhaustion",
            ToolResult::PreemptiveActions(_) => "PreemptiveActions",
            ToolResult::FailurePatterns(_) => "FailurePatterns",
            ToolResult::ScalingNeeds(_) => "ScalingNeeds",
            ToolResult::SecurityFix(_) => "SecurityFix",
            ToolResult::Shell(_) => "Shell",
            ToolResult::Error(_) => "Error",
        }
    }

    /// True when the rendered payload is empty or whitespace-only — feeds
    /// the Execution Engine's `ValidationNote::EmptyResult` check.
    pub fn is_empty_payload(&self) -> bool {
        self.llm_format().trim().is_empty()
    }
}
