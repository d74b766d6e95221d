//! In-memory metric history backing the prediction family of tools.
//! Deliberately not persisted: a restart loses trend data and the next
//! `kubectl_top_pods` call starts a fresh window.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use steward_tools::result::PodMetric;

/// Ring-buffer capacity per pod. Chosen so a few minutes of polling gives
/// enough points for a least-squares trend without growing unbounded.
pub const WINDOW: usize = 20;

#[derive(Debug, Clone)]
pub struct ContainerUsageSample {
    pub container: String,
    pub cpu_millicores: u64,
    pub memory_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct MetricSample {
    pub recorded_at: DateTime<Utc>,
    pub cpu_millicores: u64,
    pub memory_bytes: u64,
    pub containers: Vec<ContainerUsageSample>,
}

impl MetricSample {
    pub fn from_metric(metric: &PodMetric) -> Self {
        let containers: Vec<ContainerUsageSample> = metric
            .containers
            .iter()
            .map(|c| ContainerUsageSample {
                container: c.container.clone(),
                cpu_millicores: c.cpu_millicores,
                memory_bytes: c.memory_bytes,
            })
            .collect();
        let cpu_millicores = containers.iter().map(|c| c.cpu_millicores).sum();
        let memory_bytes = containers.iter().map(|c| c.memory_bytes).sum();
        Self {
            recorded_at: Utc::now(),
            cpu_millicores,
            memory_bytes,
            containers,
        }
    }
}

#[derive(Debug, Default)]
struct Window {
    samples: std::collections::VecDeque<MetricSample>,
}

impl Window {
    fn push(&mut self, sample: MetricSample) {
        if self.samples.len() == WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }
}

/// Keyed by `(namespace, pod)`, RwLock-guarded so tool dispatch (writer) and
/// concurrent analytics reads don't serialize on each other unnecessarily.
#[derive(Default)]
pub struct MetricHistory {
    windows: RwLock<HashMap<(String, String), Window>>,
}

impl MetricHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, namespace: &str, pod: &str, sample: MetricSample) {
        let mut windows = self.windows.write().await;
        windows
            .entry((namespace.to_string(), pod.to_string()))
            .or_default()
            .push(sample);
    }

    pub async fn history(&self, namespace: &str, pod: &str) -> Vec<MetricSample> {
        let windows = self.windows.read().await;
        windows
            .get(&(namespace.to_string(), pod.to_string()))
            .map(|w| w.samples.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn all_pods(&self, namespace: Option<&str>) -> Vec<(String, String)> {
        let windows = self.windows.read().await;
        windows
            .keys()
            .filter(|(ns, _)| namespace.is_none_or(|n| n == ns))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(cpu: u64, mem: u64) -> MetricSample {
        MetricSample {
            recorded_at: Utc::now(),
            cpu_millicores: cpu,
            memory_bytes: mem,
            containers: Vec::new(),
        }
    }

    #[tokio::test]
    async fn window_caps_at_capacity() {
        let history = MetricHistory::new();
        for i in 0..(WINDOW + 5) {
            history.record("default", "pod-a", sample(i as u64, i as u64)).await;
        }
        assert_eq!(history.history("default", "pod-a").await.len(), WINDOW);
    }

    #[tokio::test]
    async fn unknown_pod_has_empty_history() {
        let history = MetricHistory::new();
        assert!(history.history("default", "nope").await.is_empty());
    }
}
