//! Kubernetes executor. Built on `kube` (client, derive, runtime) +
//! `k8s-openapi`, following the pattern in the pack's
//! `loom-server-k8s::kube_client::KubeClient`: a `K8sClient` trait so tests
//! can supply a fake, with a `kube::Client`-backed production impl created
//! via `Client::try_default()`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Event, Pod};
use kube::api::{Api, DeleteParams, ListParams, LogParams, Patch, PatchParams};
use kube::{Client, ResourceExt};
use serde_json::json;

use steward_tools::error::KubernetesError;
use steward_tools::result::{
    ClusterEvent, ContainerMetric, DeleteResult, DeploymentListResult, DeploymentSummary,
    EventListResult, PodDescriptionResult, PodListResult, PodMetric, PodMetricsResult, PodSummary,
    ScaleResult,
};

use crate::tools::{CatalogTool, ToolContext};

use steward_tools::tools::analytics::ScanPodSecurityParams;
use steward_tools::tools::auto_ops::{
    AutoFixSecurityIssueParams, AutoRestartPodParams, AutoScaleIfNeededParams,
};
use steward_tools::tools::kube_ops::{
    DeletePodParams, DescribePodParams, GetDeploymentsParams, GetEventsParams, GetPodLogsParams,
    GetPodsParams, ScaleDeploymentParams, TopPodsParams,
};
use steward_tools::{Classification, ToolError, ToolGroup};

/// Resource and security-relevant fields pulled out of a container spec, for
/// the analytics executor's `resource_efficiency` and `security_scan` tools.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub container: String,
    pub cpu_limit_millicores: Option<u64>,
    pub memory_limit_bytes: Option<u64>,
    pub run_as_user: Option<i64>,
    pub privileged: bool,
    pub capabilities_add: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PodSecuritySpec {
    pub containers: Vec<ContainerSpec>,
    pub host_network: bool,
    pub pod_run_as_non_root: Option<bool>,
}

/// Abstraction over the cluster API so tests can supply a fake instead of
/// talking to a live cluster.
#[async_trait]
pub trait K8sClient: Send + Sync {
    async fn list_pods(
        &self,
        namespace: Option<&str>,
        label_selector: Option<&str>,
    ) -> Result<Vec<PodSummary>, KubernetesError>;

    async fn pod_logs(
        &self,
        namespace: &str,
        pod: &str,
        container: Option<&str>,
        tail_lines: u32,
    ) -> Result<String, KubernetesError>;

    async fn describe_pod(&self, namespace: &str, pod: &str) -> Result<PodDescriptionResult, KubernetesError>;

    async fn list_deployments(&self, namespace: Option<&str>) -> Result<Vec<DeploymentSummary>, KubernetesError>;

    async fn list_events(&self, namespace: Option<&str>, limit: u32) -> Result<Vec<ClusterEvent>, KubernetesError>;

    async fn top_pods(&self, namespace: Option<&str>) -> Result<Vec<PodMetric>, KubernetesError>;

    /// Returns the previous replica count.
    async fn scale_deployment(&self, namespace: &str, name: &str, replicas: i32) -> Result<i32, KubernetesError>;

    async fn delete_pod(&self, namespace: &str, name: &str) -> Result<(), KubernetesError>;

    async fn get_deployment_replicas(&self, namespace: &str, name: &str) -> Result<i32, KubernetesError>;

    async fn pod_security_spec(&self, namespace: &str, pod: &str) -> Result<PodSecuritySpec, KubernetesError>;
}

/// Production implementation talking to a real cluster.
pub struct KubeClient {
    client: Client,
}

impl KubeClient {
    pub async fn try_default() -> Result<Self, KubernetesError> {
        let client = Client::try_default()
            .await
            .map_err(|e| KubernetesError::Unreachable { detail: e.to_string() })?;
        Ok(Self { client })
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn deployments(&self, namespace: &str) -> Api<Deployment> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn events(&self, namespace: &str) -> Api<Event> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

fn map_kube_error(resource: &str, namespace: &str, name: &str, error: kube::Error) -> KubernetesError {
    match &error {
        kube::Error::Api(api_err) if api_err.code == 404 => KubernetesError::NotFound {
            resource: resource.to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        },
        kube::Error::Api(api_err) => KubernetesError::ApiError {
            status: api_err.code,
            detail: api_err.message.clone(),
        },
        other => KubernetesError::Unreachable { detail: other.to_string() },
    }
}

fn pod_summary(pod: &Pod) -> PodSummary {
    let status = pod.status.as_ref();
    let phase = status.and_then(|s| s.phase.clone()).unwrap_or_else(|| "Unknown".to_string());
    let container_statuses = status.and_then(|s| s.container_statuses.as_ref());
    let (ready_count, total_count) = container_statuses
        .map(|cs| (cs.iter().filter(|c| c.ready).count(), cs.len()))
        .unwrap_or((0, 0));
    let restarts = container_statuses
        .map(|cs| cs.iter().map(|c| c.restart_count).sum())
        .unwrap_or(0);
    let started_at: Option<DateTime<Utc>> = status
        .and_then(|s| s.start_time.as_ref())
        .map(|t| t.0);

    PodSummary {
        name: pod.name_any(),
        namespace: pod.namespace().unwrap_or_default(),
        phase,
        ready: format!("{ready_count}/{total_count}"),
        restarts,
        node: pod.spec.as_ref().and_then(|s| s.node_name.clone()),
        started_at,
    }
}

#[async_trait]
impl K8sClient for KubeClient {
    async fn list_pods(
        &self,
        namespace: Option<&str>,
        label_selector: Option<&str>,
    ) -> Result<Vec<PodSummary>, KubernetesError> {
        let ns = namespace.unwrap_or("default");
        let mut params = ListParams::default();
        if let Some(selector) = label_selector {
            params = params.labels(selector);
        }
        let list = self
            .pods(ns)
            .list(&params)
            .await
            .map_err(|e| map_kube_error("pods", ns, "*", e))?;
        Ok(list.items.iter().map(pod_summary).collect())
    }

    async fn pod_logs(
        &self,
        namespace: &str,
        pod: &str,
        container: Option<&str>,
        tail_lines: u32,
    ) -> Result<String, KubernetesError> {
        let params = LogParams {
            container: container.map(str::to_string),
            tail_lines: Some(i64::from(tail_lines)),
            ..Default::default()
        };
        self.pods(namespace)
            .logs(pod, &params)
            .await
            .map_err(|e| map_kube_error("pods", namespace, pod, e))
    }

    async fn describe_pod(&self, namespace: &str, pod: &str) -> Result<PodDescriptionResult, KubernetesError> {
        let fetched = self
            .pods(namespace)
            .get(pod)
            .await
            .map_err(|e| map_kube_error("pods", namespace, pod, e))?;

        let summary = pod_summary(&fetched);
        let spec_summary = fetched
            .spec
            .as_ref()
            .map(|spec| {
                let containers = spec
                    .containers
                    .iter()
                    .map(|c| c.image.clone().unwrap_or_default())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("phase={} node={} images=[{}]", summary.phase, summary.node.as_deref().unwrap_or("-"), containers)
            })
            .unwrap_or_else(|| "no spec available".to_string());

        let field_selector = format!("involvedObject.name={pod}");
        let events = self
            .events(namespace)
            .list(&ListParams::default().fields(&field_selector))
            .await
            .map_err(|e| map_kube_error("events", namespace, pod, e))?;

        let mut recent_events: Vec<ClusterEvent> = events.items.iter().map(cluster_event).collect();
        recent_events.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));
        recent_events.truncate(10);

        Ok(PodDescriptionResult {
            pod: summary,
            spec_summary,
            recent_events,
        })
    }

    async fn list_deployments(&self, namespace: Option<&str>) -> Result<Vec<DeploymentSummary>, KubernetesError> {
        let ns = namespace.unwrap_or("default");
        let list = self
            .deployments(ns)
            .list(&ListParams::default())
            .await
            .map_err(|e| map_kube_error("deployments", ns, "*", e))?;
        Ok(list.items.iter().map(deployment_summary).collect())
    }

    async fn list_events(&self, namespace: Option<&str>, limit: u32) -> Result<Vec<ClusterEvent>, KubernetesError> {
        let ns = namespace.unwrap_or("default");
        let list = self
            .events(ns)
            .list(&ListParams::default())
            .await
            .map_err(|e| map_kube_error("events", ns, "*", e))?;
        let mut events: Vec<ClusterEvent> = list.items.iter().map(cluster_event).collect();
        events.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));
        events.truncate(limit as usize);
        Ok(events)
    }

    async fn top_pods(&self, namespace: Option<&str>) -> Result<Vec<PodMetric>, KubernetesError> {
        let ns = namespace.unwrap_or("default").to_string();
        let ar = kube::discovery::ApiResource::from_gvk(&kube::core::GroupVersionKind {
            group: "metrics.k8s.io".to_string(),
            version: "v1beta1".to_string(),
            kind: "PodMetrics".to_string(),
        });
        let api: Api<kube::api::DynamicObject> = Api::namespaced_with(self.client.clone(), &ns, &ar);
        let list = api.list(&ListParams::default()).await.map_err(|e| match &e {
            kube::Error::Api(api_err) if api_err.code == 404 => KubernetesError::MetricsUnavailable,
            other => KubernetesError::Unreachable { detail: other.to_string() },
        })?;

        let mut metrics = Vec::new();
        for item in list.items {
            let pod = item.name_any();
            let containers = item
                .data
                .get("containers")
                .and_then(|v| v.as_array())
                .cloned()
                .unwrap_or_default();
            let container_metrics = containers
                .iter()
                .filter_map(|c| {
                    let name = c.get("name")?.as_str()?.to_string();
                    let cpu = c.get("usage")?.get("cpu")?.as_str()?;
                    let memory = c.get("usage")?.get("memory")?.as_str()?;
                    Some(ContainerMetric {
                        container: name,
                        cpu_millicores: parse_cpu_millicores(cpu),
                        memory_bytes: parse_memory_bytes(memory),
                    })
                })
                .collect();
            metrics.push(PodMetric {
                pod,
                namespace: ns.clone(),
                containers: container_metrics,
            });
        }
        Ok(metrics)
    }

    async fn scale_deployment(&self, namespace: &str, name: &str, replicas: i32) -> Result<i32, KubernetesError> {
        let api = self.deployments(namespace);
        let current = api
            .get(name)
            .await
            .map_err(|e| map_kube_error("deployments", namespace, name, e))?;
        let previous = current
            .spec
            .as_ref()
            .and_then(|s| s.replicas)
            .unwrap_or(0);

        let patch = json!({ "spec": { "replicas": replicas } });
        api.patch(name, &PatchParams::default(), &Patch::Merge(patch))
            .await
            .map_err(|e| map_kube_error("deployments", namespace, name, e))?;
        Ok(previous)
    }

    async fn delete_pod(&self, namespace: &str, name: &str) -> Result<(), KubernetesError> {
        self.pods(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map_err(|e| map_kube_error("pods", namespace, name, e))?;
        Ok(())
    }

    async fn get_deployment_replicas(&self, namespace: &str, name: &str) -> Result<i32, KubernetesError> {
        let deployment = self
            .deployments(namespace)
            .get(name)
            .await
            .map_err(|e| map_kube_error("deployments", namespace, name, e))?;
        Ok(deployment.spec.as_ref().and_then(|s| s.replicas).unwrap_or(0))
    }

    async fn pod_security_spec(&self, namespace: &str, pod: &str) -> Result<PodSecuritySpec, KubernetesError> {
        let fetched = self
            .pods(namespace)
            .get(pod)
            .await
            .map_err(|e| map_kube_error("pods", namespace, pod, e))?;
        Ok(pod_security_spec(&fetched))
    }
}

fn pod_security_spec(pod: &Pod) -> PodSecuritySpec {
    let Some(spec) = pod.spec.as_ref() else {
        return PodSecuritySpec {
            containers: Vec::new(),
            host_network: false,
            pod_run_as_non_root: None,
        };
    };

    let pod_run_as_non_root = spec.security_context.as_ref().and_then(|sc| sc.run_as_non_root);
    let host_network = spec.host_network.unwrap_or(false);

    let containers = spec
        .containers
        .iter()
        .map(|c| {
            let limits = c.resources.as_ref().and_then(|r| r.limits.as_ref());
            let cpu_limit_millicores = limits
                .and_then(|l| l.get("cpu"))
                .map(|q| parse_cpu_millicores(&q.0));
            let memory_limit_bytes = limits
                .and_then(|l| l.get("memory"))
                .map(|q| parse_memory_bytes(&q.0));
            let security_context = c.security_context.as_ref();
            let run_as_user = security_context.and_then(|sc| sc.run_as_user);
            let privileged = security_context.and_then(|sc| sc.privileged).unwrap_or(false);
            let capabilities_add = security_context
                .and_then(|sc| sc.capabilities.as_ref())
                .and_then(|caps| caps.add.clone())
                .unwrap_or_default();

            ContainerSpec {
                container: c.name.clone(),
                cpu_limit_millicores,
                memory_limit_bytes,
                run_as_user,
                privileged,
                capabilities_add,
            }
        })
        .collect();

    PodSecuritySpec {
        containers,
        host_network,
        pod_run_as_non_root,
    }
}

fn deployment_summary(d: &Deployment) -> DeploymentSummary {
    let status = d.status.as_ref();
    DeploymentSummary {
        name: d.name_any(),
        namespace: d.namespace().unwrap_or_default(),
        desired_replicas: d.spec.as_ref().and_then(|s| s.replicas).unwrap_or(0),
        ready_replicas: status.and_then(|s| s.ready_replicas).unwrap_or(0),
        available_replicas: status.and_then(|s| s.available_replicas).unwrap_or(0),
        image: d
            .spec
            .as_ref()
            .and_then(|s| s.template.spec.as_ref())
            .and_then(|s| s.containers.first())
            .and_then(|c| c.image.clone()),
    }
}

fn cluster_event(event: &Event) -> ClusterEvent {
    ClusterEvent {
        namespace: event.namespace().unwrap_or_default(),
        involved_object: event.involved_object.name.clone().unwrap_or_default(),
        reason: event.reason.clone().unwrap_or_default(),
        message: event.message.clone().unwrap_or_default(),
        event_type: event.type_.clone().unwrap_or_default(),
        last_seen: event.last_timestamp.as_ref().map(|t| t.0),
    }
}

fn parse_cpu_millicores(raw: &str) -> u64 {
    if let Some(n) = raw.strip_suffix('n') {
        return n.parse::<u64>().unwrap_or(0) / 1_000_000;
    }
    if let Some(m) = raw.strip_suffix('m') {
        return m.parse::<u64>().unwrap_or(0);
    }
    raw.parse::<f64>().map(|v| (v * 1000.0) as u64).unwrap_or(0)
}

fn parse_memory_bytes(raw: &str) -> u64 {
    let (number, multiplier): (&str, u64) = if let Some(n) = raw.strip_suffix("Ki") {
        (n, 1024)
    } else if let Some(n) = raw.strip_suffix("Mi") {
        (n, 1024 * 1024)
    } else if let Some(n) = raw.strip_suffix("Gi") {
        (n, 1024 * 1024 * 1024)
    } else {
        (raw, 1)
    };
    number.parse::<u64>().unwrap_or(0) * multiplier
}

// --- Catalog tools -----------------------------------------------------

pub struct GetPodsTool;

#[async_trait]
impl CatalogTool for GetPodsTool {
    type Params = GetPodsParams;
    const NAME: &'static str = steward_tools::tools::KUBECTL_GET_PODS;
    const DISPLAY_NAME: &'static str = "List pods";
    const DESCRIPTION: &'static str = "List pods in a namespace, optionally filtered by label selector.";
    const CLASSIFICATION: Classification = Classification::Safe;
    const GROUP: ToolGroup = ToolGroup::Observation;

    async fn execute(&self, params: Self::Params, ctx: &ToolContext) -> Result<steward_tools::ToolResult, ToolError> {
        let pods = ctx
            .k8s
            .list_pods(params.namespace.as_deref(), params.label_selector.as_deref())
            .await
            .map_err(wrap_k8s_error)?;
        Ok(PodListResult { namespace: params.namespace, pods }.into())
    }
}

pub struct GetPodLogsTool;

#[async_trait]
impl CatalogTool for GetPodLogsTool {
    type Params = GetPodLogsParams;
    const NAME: &'static str = steward_tools::tools::KUBECTL_GET_POD_LOGS;
    const DISPLAY_NAME: &'static str = "Get pod logs";
    const DESCRIPTION: &'static str = "Tail a pod's logs.";
    const CLASSIFICATION: Classification = Classification::Safe;
    const GROUP: ToolGroup = ToolGroup::Observation;

    async fn execute(&self, params: Self::Params, ctx: &ToolContext) -> Result<steward_tools::ToolResult, ToolError> {
        let content = ctx
            .k8s
            .pod_logs(&params.namespace, &params.pod_name, params.container.as_deref(), params.tail_lines)
            .await
            .map_err(wrap_k8s_error)?;
        Ok(steward_tools::result::PodLogsResult {
            pod: params.pod_name,
            namespace: params.namespace,
            container: params.container,
            content,
        }
        .into())
    }
}

pub struct DescribePodTool;

#[async_trait]
impl CatalogTool for DescribePodTool {
    type Params = DescribePodParams;
    const NAME: &'static str = steward_tools::tools::KUBECTL_DESCRIBE_POD;
    const DISPLAY_NAME: &'static str = "Describe pod";
    const DESCRIPTION: &'static str = "Detailed pod spec, status, and its most recent events.";
    const CLASSIFICATION: Classification = Classification::Safe;
    const GROUP: ToolGroup = ToolGroup::Observation;

    async fn execute(&self, params: Self::Params, ctx: &ToolContext) -> Result<steward_tools::ToolResult, ToolError> {
        let description = ctx
            .k8s
            .describe_pod(&params.namespace, &params.pod_name)
            .await
            .map_err(wrap_k8s_error)?;
        Ok(description.into())
    }
}

pub struct GetDeploymentsTool;

#[async_trait]
impl CatalogTool for GetDeploymentsTool {
    type Params = GetDeploymentsParams;
    const NAME: &'static str = steward_tools::tools::KUBECTL_GET_DEPLOYMENTS;
    const DISPLAY_NAME: &'static str = "List deployments";
    const DESCRIPTION: &'static str = "List deployments in a namespace.";
    const CLASSIFICATION: Classification = Classification::Safe;
    const GROUP: ToolGroup = ToolGroup::Observation;

    async fn execute(&self, params: Self::Params, ctx: &ToolContext) -> Result<steward_tools::ToolResult, ToolError> {
        let deployments = ctx.k8s.list_deployments(params.namespace.as_deref()).await.map_err(wrap_k8s_error)?;
        Ok(DeploymentListResult { namespace: params.namespace, deployments }.into())
    }
}

pub struct GetEventsTool;

#[async_trait]
impl CatalogTool for GetEventsTool {
    type Params = GetEventsParams;
    const NAME: &'static str = steward_tools::tools::KUBECTL_GET_EVENTS;
    const DISPLAY_NAME: &'static str = "List events";
    const DESCRIPTION: &'static str = "Recent cluster events.";
    const CLASSIFICATION: Classification = Classification::Safe;
    const GROUP: ToolGroup = ToolGroup::Observation;

    async fn execute(&self, params: Self::Params, ctx: &ToolContext) -> Result<steward_tools::ToolResult, ToolError> {
        let events = ctx.k8s.list_events(params.namespace.as_deref(), params.limit).await.map_err(wrap_k8s_error)?;
        Ok(EventListResult { namespace: params.namespace, events }.into())
    }
}

pub struct TopPodsTool;

#[async_trait]
impl CatalogTool for TopPodsTool {
    type Params = TopPodsParams;
    const NAME: &'static str = steward_tools::tools::KUBECTL_TOP_PODS;
    const DISPLAY_NAME: &'static str = "Pod resource usage";
    const DESCRIPTION: &'static str = "CPU/memory metric snapshot for pods, via the metrics API.";
    const CLASSIFICATION: Classification = Classification::Safe;
    const GROUP: ToolGroup = ToolGroup::Observation;

    async fn execute(&self, params: Self::Params, ctx: &ToolContext) -> Result<steward_tools::ToolResult, ToolError> {
        let metrics = ctx.k8s.top_pods(params.namespace.as_deref()).await.map_err(wrap_k8s_error)?;
        for m in &metrics {
            ctx.history
                .record(&m.namespace, &m.pod, crate::analytics::history::MetricSample::from_metric(m))
                .await;
        }
        Ok(PodMetricsResult { namespace: params.namespace, metrics }.into())
    }
}

pub struct ScaleDeploymentTool;

#[async_trait]
impl CatalogTool for ScaleDeploymentTool {
    type Params = ScaleDeploymentParams;
    const NAME: &'static str = steward_tools::tools::KUBECTL_SCALE_DEPLOYMENT;
    const DISPLAY_NAME: &'static str = "Scale deployment";
    const DESCRIPTION: &'static str = "Set a deployment's replica count.";
    const CLASSIFICATION: Classification = Classification::Dangerous;
    const GROUP: ToolGroup = ToolGroup::Mutation;

    async fn execute(&self, params: Self::Params, ctx: &ToolContext) -> Result<steward_tools::ToolResult, ToolError> {
        if params.replicas < 0 {
            return Err(ToolError::invalid_params(Self::NAME, "replicas must be >= 0"));
        }
        let previous = ctx
            .k8s
            .scale_deployment(&params.namespace, &params.deployment_name, params.replicas)
            .await
            .map_err(wrap_k8s_error)?;
        Ok(ScaleResult {
            deployment: params.deployment_name,
            namespace: params.namespace,
            previous_replicas: previous,
            new_replicas: params.replicas,
        }
        .into())
    }
}

pub struct DeletePodTool;

#[async_trait]
impl CatalogTool for DeletePodTool {
    type Params = DeletePodParams;
    const NAME: &'static str = steward_tools::tools::KUBECTL_DELETE_POD;
    const DISPLAY_NAME: &'static str = "Delete pod";
    const DESCRIPTION: &'static str = "Delete a pod.";
    const CLASSIFICATION: Classification = Classification::Dangerous;
    const GROUP: ToolGroup = ToolGroup::Mutation;

    async fn execute(&self, params: Self::Params, ctx: &ToolContext) -> Result<steward_tools::ToolResult, ToolError> {
        ctx.k8s.delete_pod(&params.namespace, &params.pod_name).await.map_err(wrap_k8s_error)?;
        Ok(DeleteResult {
            pod: params.pod_name,
            namespace: params.namespace,
            deleted: true,
        }
        .into())
    }
}

pub struct AutoRestartPodTool;

#[async_trait]
impl CatalogTool for AutoRestartPodTool {
    type Params = AutoRestartPodParams;
    const NAME: &'static str = steward_tools::tools::AUTO_RESTART_POD;
    const DISPLAY_NAME: &'static str = "Auto-restart pod";
    const DESCRIPTION: &'static str = "Delete a pod so its controller recreates it.";
    const CLASSIFICATION: Classification = Classification::Dangerous;
    const GROUP: ToolGroup = ToolGroup::Mutation;

    async fn execute(&self, params: Self::Params, ctx: &ToolContext) -> Result<steward_tools::ToolResult, ToolError> {
        ctx.k8s.delete_pod(&params.namespace, &params.pod_name).await.map_err(wrap_k8s_error)?;
        Ok(DeleteResult {
            pod: params.pod_name,
            namespace: params.namespace,
            deleted: true,
        }
        .into())
    }
}

pub struct AutoScaleIfNeededTool;

#[async_trait]
impl CatalogTool for AutoScaleIfNeededTool {
    type Params = AutoScaleIfNeededParams;
    const NAME: &'static str = steward_tools::tools::AUTO_SCALE_IF_NEEDED;
    const DISPLAY_NAME: &'static str = "Auto-scale if needed";
    const DESCRIPTION: &'static str = "Apply the replica count suggested by predict_scaling_needs.";
    const CLASSIFICATION: Classification = Classification::Dangerous;
    const GROUP: ToolGroup = ToolGroup::Mutation;

    async fn execute(&self, params: Self::Params, ctx: &ToolContext) -> Result<steward_tools::ToolResult, ToolError> {
        let current = ctx
            .k8s
            .get_deployment_replicas(&params.namespace, &params.deployment_name)
            .await
            .map_err(wrap_k8s_error)?;
        let suggestion = crate::analytics::formulas::suggest_scaling(
            &ctx.history,
            &params.namespace,
            &params.deployment_name,
            current,
            ctx.config.cluster.scaling_ceiling,
        )
        .await;

        let Some(target) = suggestion else {
            return Ok(ScaleResult {
                deployment: params.deployment_name,
                namespace: params.namespace,
                previous_replicas: current,
                new_replicas: current,
            }
            .into());
        };

        let previous = ctx
            .k8s
            .scale_deployment(&params.namespace, &params.deployment_name, target)
            .await
            .map_err(wrap_k8s_error)?;
        Ok(ScaleResult {
            deployment: params.deployment_name,
            namespace: params.namespace,
            previous_replicas: previous,
            new_replicas: target,
        }
        .into())
    }
}

pub struct AutoFixSecurityIssueTool;

#[async_trait]
impl CatalogTool for AutoFixSecurityIssueTool {
    type Params = AutoFixSecurityIssueParams;
    const NAME: &'static str = steward_tools::tools::AUTO_FIX_SECURITY_ISSUE;
    const DISPLAY_NAME: &'static str = "Auto-fix security issue";
    const DESCRIPTION: &'static str = "Remediate one flagged security issue on a pod.";
    const CLASSIFICATION: Classification = Classification::Dangerous;
    const GROUP: ToolGroup = ToolGroup::Mutation;

    async fn execute(&self, params: Self::Params, ctx: &ToolContext) -> Result<steward_tools::ToolResult, ToolError> {
        // Most security-context fields are immutable on a running Pod.
        // The only live remediation available here is deleting the pod so
        // its owning controller recreates it from a (separately corrected)
        // template; this tool does not edit controller templates.
        ctx.k8s.delete_pod(&params.namespace, &params.pod_name).await.map_err(wrap_k8s_error)?;
        Ok(steward_tools::result::SecurityFixResult {
            pod: params.pod_name,
            namespace: params.namespace,
            issue: params.issue,
            patched: true,
            detail: "pod deleted for recreation by its controller; update the controller template to persist the fix".to_string(),
        }
        .into())
    }
}

fn wrap_k8s_error(error: KubernetesError) -> ToolError {
    ToolError::Execution(steward_tools::error::ToolExecutionError::Kubernetes(error))
}
