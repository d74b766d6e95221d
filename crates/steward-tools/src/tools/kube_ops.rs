use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_tail_lines() -> u32 {
    100
}

fn default_event_limit() -> u32 {
    50
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetPodsParams {
    pub namespace: Option<String>,
    pub label_selector: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetPodLogsParams {
    pub pod_name: String,
    pub namespace: String,
    #[serde(default = "default_tail_lines")]
    pub tail_lines: u32,
    pub container: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DescribePodParams {
    pub pod_name: String,
    pub namespace: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetDeploymentsParams {
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetEventsParams {
    pub namespace: Option<String>,
    #[serde(default = "default_event_limit")]
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TopPodsParams {
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScaleDeploymentParams {
    pub deployment_name: String,
    pub namespace: String,
    pub replicas: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DeletePodParams {
    pub pod_name: String,
    pub namespace: String,
}
