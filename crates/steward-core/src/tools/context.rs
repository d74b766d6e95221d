use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::analytics::history::MetricHistory;
use crate::config::Config;
use crate::executors::kubernetes::K8sClient;

/// Bundle of dependencies handed to every tool at dispatch time: exactly
/// what this engine's executors need, nothing more.
#[derive(Clone)]
pub struct ToolContext {
    pub k8s: Arc<dyn K8sClient>,
    pub history: Arc<MetricHistory>,
    pub config: Arc<Config>,
    pub cancellation_token: CancellationToken,
}

impl ToolContext {
    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }
}
