use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::result::SecurityIssue;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AutoRestartPodParams {
    pub pod_name: String,
    pub namespace: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AutoScaleIfNeededParams {
    pub deployment_name: String,
    pub namespace: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AutoFixSecurityIssueParams {
    pub pod_name: String,
    pub namespace: String,
    pub issue: SecurityIssue,
}
