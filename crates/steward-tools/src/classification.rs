use serde::{Deserialize, Serialize};

/// Whether a tool only observes external state or mutates it.
///
/// Any operation that mutates a cluster, deletes a resource, or runs
/// arbitrary host code is `Dangerous`. Everything else is `Safe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Safe,
    Dangerous,
}

impl Classification {
    pub fn is_dangerous(self) -> bool {
        matches!(self, Classification::Dangerous)
    }
}

/// Display-only grouping used by `tools list`; has no bearing on
/// classification or approval gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolGroup {
    Observation,
    Mutation,
    Analytics,
    Shell,
}
