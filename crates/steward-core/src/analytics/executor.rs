//! Derived analytics tools: read-only reasoning over live cluster state
//! (pod specs, events) and the in-process metric ring buffer. None of these
//! mutate the cluster; the two analytics-flavored tools that do
//! (`auto_scale_if_needed`, `auto_fix_security_issue`) live in
//! [`crate::executors::kubernetes`] instead, since they need write access.

use async_trait::async_trait;

use steward_tools::result::{
    ContainerEfficiency, FailurePattern, FailurePatternReport, PreemptiveActionsReport,
    ProvisioningVerdict, ResourceExhaustionReport, ResourcePrediction, ScalingNeedsReport,
    ScalingSuggestion, SecurityFinding, SecurityIssue, SecurityScanReport, Severity,
};
use steward_tools::tools::analytics::{
    AnalyzeResourceEfficiencyParams, IdentifyFailurePatternsParams, PredictResourceExhaustionParams,
    PredictScalingNeedsParams, ScanPodSecurityParams, SuggestPreemptiveActionsParams,
};
use steward_tools::{Classification, ToolError, ToolGroup};

use crate::executors::kubernetes::{ContainerSpec, PodSecuritySpec};
use crate::tools::{CatalogTool, ToolContext};

use super::formulas::{self, MIN_CONFIDENT_SAMPLES};
use super::history::MetricSample;

fn wrap_k8s_error(error: steward_tools::error::KubernetesError) -> ToolError {
    ToolError::Execution(steward_tools::error::ToolExecutionError::Kubernetes(error))
}

fn average_container_usage(samples: &[MetricSample], container: &str) -> Option<(f64, f64)> {
    let mut cpu_total = 0.0;
    let mut mem_total = 0.0;
    let mut count = 0;
    for sample in samples {
        if let Some(c) = sample.containers.iter().find(|c| c.container == container) {
            cpu_total += c.cpu_millicores as f64;
            mem_total += c.memory_bytes as f64;
            count += 1;
        }
    }
    if count == 0 {
        None
    } else {
        Some((cpu_total / count as f64, mem_total / count as f64))
    }
}

fn verdict_for_ratio(ratio: f64) -> ProvisioningVerdict {
    if ratio < 0.20 {
        ProvisioningVerdict::OverProvisioned
    } else if ratio > 0.80 {
        ProvisioningVerdict::UnderProvisioned
    } else {
        ProvisioningVerdict::Balanced
    }
}

fn security_findings_for_pod(
    pod: &str,
    namespace: &str,
    spec: &PodSecuritySpec,
) -> Vec<SecurityFinding> {
    let mut findings = Vec::new();

    if spec.host_network {
        findings.push(SecurityFinding {
            pod: pod.to_string(),
            namespace: namespace.to_string(),
            container: None,
            issue: SecurityIssue::HostNetwork,
            severity: Severity::Medium,
            detail: "pod shares the host network namespace".to_string(),
        });
    }

    for container in &spec.containers {
        findings.extend(security_findings_for_container(pod, namespace, container, spec.pod_run_as_non_root));
    }

    findings
}

fn security_findings_for_container(
    pod: &str,
    namespace: &str,
    container: &ContainerSpec,
    pod_run_as_non_root: Option<bool>,
) -> Vec<SecurityFinding> {
    let mut findings = Vec::new();
    let base = |issue: SecurityIssue, severity: Severity, detail: &str| SecurityFinding {
        pod: pod.to_string(),
        namespace: namespace.to_string(),
        container: Some(container.container.clone()),
        issue,
        severity,
        detail: detail.to_string(),
    };

    let runs_as_root = match container.run_as_user {
        Some(0) => true,
        Some(_) => false,
        None => pod_run_as_non_root != Some(true),
    };
    if runs_as_root {
        findings.push(base(
            SecurityIssue::RunningAsRoot,
            Severity::High,
            "no non-root runAsUser set at container or pod level",
        ));
    }

    if container.cpu_limit_millicores.is_none() || container.memory_limit_bytes.is_none() {
        findings.push(base(
            SecurityIssue::MissingResourceLimits,
            Severity::Low,
            "container has no cpu or memory limit, risking node-level resource starvation",
        ));
    }

    if container.privileged {
        findings.push(base(SecurityIssue::Privileged, Severity::High, "container runs privileged"));
    }

    const DANGEROUS: [&str; 4] = ["SYS_ADMIN", "NET_ADMIN", "SYS_PTRACE", "ALL"];
    if container.capabilities_add.iter().any(|cap| DANGEROUS.contains(&cap.as_str())) {
        findings.push(base(
            SecurityIssue::DangerousCapabilities,
            Severity::High,
            &format!("container adds capabilities: {}", container.capabilities_add.join(", ")),
        ));
    }

    findings
}

pub struct ResourceEfficiencyTool;

#[async_trait]
impl CatalogTool for ResourceEfficiencyTool {
    type Params = AnalyzeResourceEfficiencyParams;
    const NAME: &'static str = steward_tools::tools::ANALYZE_RESOURCE_EFFICIENCY;
    const DISPLAY_NAME: &'static str = "Analyze resource efficiency";
    const DESCRIPTION: &'static str = "Compare sustained usage against declared limits for every container in a namespace.";
    const CLASSIFICATION: Classification = Classification::Safe;
    const GROUP: ToolGroup = ToolGroup::Analytics;

    async fn execute(&self, params: Self::Params, ctx: &ToolContext) -> Result<steward_tools::ToolResult, ToolError> {
        let pods = ctx.k8s.list_pods(params.namespace.as_deref(), None).await.map_err(wrap_k8s_error)?;

        let mut findings = Vec::new();
        for pod in &pods {
            let spec = ctx
                .k8s
                .pod_security_spec(&pod.namespace, &pod.name)
                .await
                .map_err(wrap_k8s_error)?;
            let samples = ctx.history.history(&pod.namespace, &pod.name).await;

            for container in &spec.containers {
                let Some(cpu_limit) = container.cpu_limit_millicores else {
                    findings.push(ContainerEfficiency {
                        pod: pod.name.clone(),
                        namespace: pod.namespace.clone(),
                        container: container.container.clone(),
                        usage_ratio: None,
                        verdict: ProvisioningVerdict::NoLimitSet,
                    });
                    continue;
                };
                let usage_ratio = average_container_usage(&samples, &container.container)
                    .map(|(cpu_avg, _)| cpu_avg / cpu_limit as f64);

                findings.push(ContainerEfficiency {
                    pod: pod.name.clone(),
                    namespace: pod.namespace.clone(),
                    container: container.container.clone(),
                    usage_ratio,
                    verdict: usage_ratio.map(verdict_for_ratio).unwrap_or(ProvisioningVerdict::NoLimitSet),
                });
            }
        }

        Ok(steward_tools::result::ResourceEfficiencyReport { namespace: params.namespace, findings }.into())
    }
}

pub struct ScanPodSecurityTool;

#[async_trait]
impl CatalogTool for ScanPodSecurityTool {
    type Params = ScanPodSecurityParams;
    const NAME: &'static str = steward_tools::tools::SCAN_POD_SECURITY;
    const DISPLAY_NAME: &'static str = "Scan pod security";
    const DESCRIPTION: &'static str = "Flag common security misconfigurations on a single pod.";
    const CLASSIFICATION: Classification = Classification::Safe;
    const GROUP: ToolGroup = ToolGroup::Analytics;

    async fn execute(&self, params: Self::Params, ctx: &ToolContext) -> Result<steward_tools::ToolResult, ToolError> {
        let spec = ctx
            .k8s
            .pod_security_spec(&params.namespace, &params.pod_name)
            .await
            .map_err(wrap_k8s_error)?;
        let findings = security_findings_for_pod(&params.pod_name, &params.namespace, &spec);
        Ok(SecurityScanReport { namespace: Some(params.namespace), findings }.into())
    }
}

fn predictions_for_namespace(
    pods: &[(String, String)],
    sample_rows: &[Vec<MetricSample>],
) -> Vec<ResourcePrediction> {
    let mut predictions = Vec::new();
    for ((namespace, pod), samples) in pods.iter().zip(sample_rows.iter()) {
        if samples.is_empty() {
            continue;
        }
        let cpu: Vec<u64> = samples.iter().map(|s| s.cpu_millicores).collect();
        let mem: Vec<u64> = samples.iter().map(|s| s.memory_bytes).collect();
        let low_confidence = samples.len() < MIN_CONFIDENT_SAMPLES;

        let cpu_trend = formulas::trend_pct(&cpu);
        predictions.push(ResourcePrediction {
            pod: pod.clone(),
            namespace: namespace.clone(),
            resource: "cpu".to_string(),
            trend_pct: cpu_trend,
            verdict: formulas::verdict_for_trend(cpu_trend),
            samples: samples.len(),
            low_confidence,
        });

        let mem_trend = formulas::trend_pct(&mem);
        predictions.push(ResourcePrediction {
            pod: pod.clone(),
            namespace: namespace.clone(),
            resource: "memory".to_string(),
            trend_pct: mem_trend,
            verdict: formulas::verdict_for_trend(mem_trend),
            samples: samples.len(),
            low_confidence,
        });
    }
    predictions
}

pub struct PredictResourceExhaustionTool;

#[async_trait]
impl CatalogTool for PredictResourceExhaustionTool {
    type Params = PredictResourceExhaustionParams;
    const NAME: &'static str = steward_tools::tools::PREDICT_RESOURCE_EXHAUSTION;
    const DISPLAY_NAME: &'static str = "Predict resource exhaustion";
    const DESCRIPTION: &'static str = "Project CPU/memory trend from recent metric samples.";
    const CLASSIFICATION: Classification = Classification::Safe;
    const GROUP: ToolGroup = ToolGroup::Analytics;

    async fn execute(&self, params: Self::Params, ctx: &ToolContext) -> Result<steward_tools::ToolResult, ToolError> {
        let pods = ctx.history.all_pods(params.namespace.as_deref()).await;
        let mut rows = Vec::with_capacity(pods.len());
        for (ns, pod) in &pods {
            rows.push(ctx.history.history(ns, pod).await);
        }
        let predictions = predictions_for_namespace(&pods, &rows);
        Ok(ResourceExhaustionReport { namespace: params.namespace, predictions }.into())
    }
}

pub struct SuggestPreemptiveActionsTool;

#[async_trait]
impl CatalogTool for SuggestPreemptiveActionsTool {
    type Params = SuggestPreemptiveActionsParams;
    const NAME: &'static str = steward_tools::tools::SUGGEST_PREEMPTIVE_ACTIONS;
    const DISPLAY_NAME: &'static str = "Suggest preemptive actions";
    const DESCRIPTION: &'static str = "Turn a Warning/Critical resource prediction into a concrete recommendation.";
    const CLASSIFICATION: Classification = Classification::Safe;
    const GROUP: ToolGroup = ToolGroup::Analytics;

    async fn execute(&self, params: Self::Params, ctx: &ToolContext) -> Result<steward_tools::ToolResult, ToolError> {
        let pods = ctx.history.all_pods(params.namespace.as_deref()).await;
        let mut rows = Vec::with_capacity(pods.len());
        for (ns, pod) in &pods {
            rows.push(ctx.history.history(ns, pod).await);
        }
        let predictions = predictions_for_namespace(&pods, &rows);

        let recommendations = predictions
            .iter()
            .filter(|p| !matches!(p.verdict, steward_tools::result::PredictionVerdict::Stable))
            .map(|p| match p.resource.as_str() {
                "cpu" => format!(
                    "{}/{}: CPU trending {:+.0}% ({:?}) - scale up or raise the CPU limit",
                    p.namespace, p.pod, p.trend_pct, p.verdict
                ),
                _ => format!(
                    "{}/{}: memory trending {:+.0}% ({:?}) - investigate for a leak or raise the memory limit",
                    p.namespace, p.pod, p.trend_pct, p.verdict
                ),
            })
            .collect();

        Ok(PreemptiveActionsReport { namespace: params.namespace, recommendations }.into())
    }
}

pub struct IdentifyFailurePatternsTool;

#[async_trait]
impl CatalogTool for IdentifyFailurePatternsTool {
    type Params = IdentifyFailurePatternsParams;
    const NAME: &'static str = steward_tools::tools::IDENTIFY_FAILURE_PATTERNS;
    const DISPLAY_NAME: &'static str = "Identify failure patterns";
    const DESCRIPTION: &'static str = "Group Warning-type cluster events by reason to surface recurring failures.";
    const CLASSIFICATION: Classification = Classification::Safe;
    const GROUP: ToolGroup = ToolGroup::Analytics;

    async fn execute(&self, params: Self::Params, ctx: &ToolContext) -> Result<steward_tools::ToolResult, ToolError> {
        let events = ctx.k8s.list_events(params.namespace.as_deref(), 200).await.map_err(wrap_k8s_error)?;

        let mut groups: std::collections::HashMap<String, FailurePattern> = std::collections::HashMap::new();
        for event in events.into_iter().filter(|e| e.event_type.eq_ignore_ascii_case("warning")) {
            let entry = groups.entry(event.reason.clone()).or_insert_with(|| FailurePattern {
                reason: event.reason.clone(),
                occurrences: 0,
                pods: Vec::new(),
            });
            entry.occurrences += 1;
            if !entry.pods.contains(&event.involved_object) {
                entry.pods.push(event.involved_object);
            }
        }

        let mut patterns: Vec<FailurePattern> = groups.into_values().collect();
        patterns.sort_by(|a, b| b.occurrences.cmp(&a.occurrences));

        Ok(FailurePatternReport { namespace: params.namespace, patterns }.into())
    }
}

pub struct PredictScalingNeedsTool;

#[async_trait]
impl CatalogTool for PredictScalingNeedsTool {
    type Params = PredictScalingNeedsParams;
    const NAME: &'static str = steward_tools::tools::PREDICT_SCALING_NEEDS;
    const DISPLAY_NAME: &'static str = "Predict scaling needs";
    const DESCRIPTION: &'static str = "Extrapolate usage trend against current replica count to suggest a target.";
    const CLASSIFICATION: Classification = Classification::Safe;
    const GROUP: ToolGroup = ToolGroup::Analytics;

    async fn execute(&self, params: Self::Params, ctx: &ToolContext) -> Result<steward_tools::ToolResult, ToolError> {
        let current_replicas = ctx
            .k8s
            .get_deployment_replicas(&params.namespace, &params.deployment_name)
            .await
            .map_err(wrap_k8s_error)?;

        let suggestion = formulas::suggest_scaling(
            &ctx.history,
            &params.namespace,
            &params.deployment_name,
            current_replicas,
            ctx.config.cluster.scaling_ceiling,
        )
        .await;

        let suggestions = match suggestion {
            Some(target) if target > current_replicas => vec![ScalingSuggestion {
                deployment: params.deployment_name,
                namespace: params.namespace,
                current_replicas,
                suggested_replicas: target,
                rationale: "sustained upward CPU trend over the metric window".to_string(),
            }],
            Some(target) => vec![ScalingSuggestion {
                deployment: params.deployment_name,
                namespace: params.namespace,
                current_replicas,
                suggested_replicas: target,
                rationale: "sustained downward CPU trend over the metric window".to_string(),
            }],
            None => Vec::new(),
        };

        Ok(ScalingNeedsReport { namespace: Some(params.namespace), suggestions }.into())
    }
}
