//! End-to-end coverage over `Engine`, driven by a scripted `EchoProvider`
//! and a canned `K8sClient`. Each test exercises one of the seed scenarios:
//! a safe observation, an approved and a rejected dangerous mutation,
//! strict-mode escalation of a safe call, a schema violation rejected
//! before approval, and expiry of an undecided approval.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use steward_core::approval::ApprovalMode;
use steward_core::config::{Config, ModelId};
use steward_core::domain::{
    AuditStatus, ConversationId, ExecutionId, PendingExecution, PendingStatus, ToolCallId,
    ToolResultStatus, TurnBody,
};
use steward_core::error::Error;
use steward_core::executors::K8sClient;
use steward_core::llm::test_utils::EchoProvider;
use steward_core::store::{AuditStore, InMemoryStore, PendingStore};
use steward_core::Engine;

use steward_tools::error::KubernetesError;
use steward_tools::result::{
    ClusterEvent, DeploymentSummary, PodDescriptionResult, PodMetric, PodSummary,
};
use steward_tools::Classification;

/// Canned cluster: `list_pods` returns one running pod, `scale_deployment`
/// reports a previous replica count of 2 and accepts any new count. Every
/// other method is unreached by these scenarios and returns an empty or
/// unreachable stub.
struct FakeK8sClient;

#[async_trait]
impl K8sClient for FakeK8sClient {
    async fn list_pods(
        &self,
        namespace: Option<&str>,
        _label_selector: Option<&str>,
    ) -> Result<Vec<PodSummary>, KubernetesError> {
        Ok(vec![PodSummary {
            name: "web-7d8f-abcde".to_string(),
            namespace: namespace.unwrap_or("default").to_string(),
            phase: "Running".to_string(),
            ready: "1/1".to_string(),
            restarts: 0,
            node: Some("node-1".to_string()),
            started_at: Some(Utc::now()),
        }])
    }

    async fn pod_logs(
        &self,
        _namespace: &str,
        _pod: &str,
        _container: Option<&str>,
        _tail_lines: u32,
    ) -> Result<String, KubernetesError> {
        Ok(String::new())
    }

    async fn describe_pod(&self, namespace: &str, pod: &str) -> Result<PodDescriptionResult, KubernetesError> {
        Ok(PodDescriptionResult {
            pod: PodSummary {
                name: pod.to_string(),
                namespace: namespace.to_string(),
                phase: "Running".to_string(),
                ready: "1/1".to_string(),
                restarts: 0,
                node: None,
                started_at: None,
            },
            spec_summary: String::new(),
            recent_events: Vec::<ClusterEvent>::new(),
        })
    }

    async fn list_deployments(&self, _namespace: Option<&str>) -> Result<Vec<DeploymentSummary>, KubernetesError> {
        Ok(Vec::new())
    }

    async fn list_events(&self, _namespace: Option<&str>, _limit: u32) -> Result<Vec<ClusterEvent>, KubernetesError> {
        Ok(Vec::new())
    }

    async fn top_pods(&self, _namespace: Option<&str>) -> Result<Vec<PodMetric>, KubernetesError> {
        Ok(Vec::new())
    }

    async fn scale_deployment(&self, _namespace: &str, _name: &str, _replicas: i32) -> Result<i32, KubernetesError> {
        Ok(2)
    }

    async fn delete_pod(&self, _namespace: &str, _name: &str) -> Result<(), KubernetesError> {
        Ok(())
    }

    async fn get_deployment_replicas(&self, _namespace: &str, _name: &str) -> Result<i32, KubernetesError> {
        Ok(2)
    }

    async fn pod_security_spec(
        &self,
        _namespace: &str,
        _pod: &str,
    ) -> Result<steward_core::executors::kubernetes::PodSecuritySpec, KubernetesError> {
        Ok(steward_core::executors::kubernetes::PodSecuritySpec {
            containers: Vec::new(),
            host_network: false,
            pod_run_as_non_root: None,
        })
    }
}

fn model() -> ModelId {
    ModelId::parse("echo/test").unwrap()
}

fn engine_with(provider: EchoProvider) -> (Engine, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let conversation_store = store.clone() as Arc<dyn steward_core::store::ConversationStore>;
    let pending_store = store.clone() as Arc<dyn PendingStore>;
    let audit_store = store.clone() as Arc<dyn AuditStore>;
    let k8s: Arc<dyn K8sClient> = Arc::new(FakeK8sClient);
    let engine = Engine::new(
        Arc::new(Config::default()),
        conversation_store,
        pending_store,
        audit_store,
        k8s,
        Arc::new(provider),
    );
    (engine, store)
}

#[tokio::test]
async fn safe_observation_runs_without_suspending() {
    let provider = EchoProvider::new(vec![
        EchoProvider::tool_use("call-1", "kubectl_get_pods", serde_json::json!({ "namespace": "default" })),
        EchoProvider::text("There is one pod running in default."),
    ]);
    let (engine, store) = engine_with(provider);

    let outcome = engine
        .chat(None, "What pods are running?", model(), None)
        .await
        .unwrap();

    assert!(outcome.pending_execution.is_none());
    assert_eq!(outcome.response_text.as_deref(), Some("There is one pod running in default."));
    assert_eq!(outcome.tool_results.len(), 1);

    let history = store.list(10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, AuditStatus::Success);
    assert_eq!(history[0].approver, None);
}

#[tokio::test]
async fn dangerous_call_suspends_then_runs_once_approved() {
    let provider = EchoProvider::new(vec![
        EchoProvider::tool_use(
            "call-1",
            "kubectl_scale_deployment",
            serde_json::json!({ "deployment_name": "frontend", "namespace": "production", "replicas": 5 }),
        ),
        EchoProvider::text("Scaled frontend to 5 replicas."),
    ]);
    let (engine, store) = engine_with(provider);

    let outcome = engine.chat(None, "Scale frontend to 5.", model(), None).await.unwrap();
    let execution_id = outcome.pending_execution.expect("dangerous call should suspend");
    assert!(outcome.response_text.is_none());

    let pending = store.list_pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].execution_id, execution_id);
    assert_eq!(pending[0].classification, Classification::Dangerous);

    let resumed = engine.approve(execution_id, "alice", None, model()).await.unwrap();
    assert_eq!(resumed.response_text.as_deref(), Some("Scaled frontend to 5 replicas."));
    assert!(resumed.pending_execution.is_none());

    let history = store.list(10).await.unwrap();
    let record = history.iter().find(|r| r.tool_name == "kubectl_scale_deployment").unwrap();
    assert_eq!(record.status, AuditStatus::Success);
    assert_eq!(record.approver.as_deref(), Some("alice"));

    let conversation = engine.load_conversation(resumed.conversation_id).await.unwrap().unwrap();
    let tool_result_status = conversation.turns.iter().find_map(|t| match &t.body {
        TurnBody::ToolResult { status, execution_id: None, .. } => Some(*status),
        _ => None,
    });
    assert_eq!(tool_result_status, Some(ToolResultStatus::Ok));
}

#[tokio::test]
async fn dangerous_call_rejected_records_user_rejected() {
    let provider = EchoProvider::new(vec![
        EchoProvider::tool_use(
            "call-1",
            "kubectl_scale_deployment",
            serde_json::json!({ "deployment_name": "frontend", "namespace": "production", "replicas": 5 }),
        ),
        EchoProvider::text("Understood, leaving it alone."),
    ]);
    let (engine, store) = engine_with(provider);

    let outcome = engine.chat(None, "Scale frontend to 5.", model(), None).await.unwrap();
    let execution_id = outcome.pending_execution.expect("dangerous call should suspend");

    let resumed = engine.reject(execution_id, "alice", model()).await.unwrap();
    assert_eq!(resumed.response_text.as_deref(), Some("Understood, leaving it alone."));

    let history = store.list(10).await.unwrap();
    let record = history.iter().find(|r| r.tool_name == "kubectl_scale_deployment").unwrap();
    assert_eq!(record.status, AuditStatus::Rejected);
    assert_eq!(record.approver.as_deref(), Some("alice"));

    let conversation = engine.load_conversation(resumed.conversation_id).await.unwrap().unwrap();
    let reason = conversation.turns.iter().find_map(|t| match &t.body {
        TurnBody::ToolResult { reason: Some(reason), .. } => Some(reason.clone()),
        _ => None,
    });
    assert_eq!(reason.as_deref(), Some("user_rejected"));
}

#[tokio::test]
async fn strict_mode_suspends_even_a_safe_call() {
    let provider = EchoProvider::new(vec![EchoProvider::tool_use(
        "call-1",
        "kubectl_get_pods",
        serde_json::json!({ "namespace": "default" }),
    )]);
    let (engine, store) = engine_with(provider);

    let outcome = engine
        .chat(None, "List pods.", model(), Some(ApprovalMode::Strict))
        .await
        .unwrap();

    assert!(outcome.pending_execution.is_some());
    let pending = store.list_pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].classification, Classification::Safe);
}

#[tokio::test]
async fn negative_replica_count_is_rejected_before_approval() {
    let provider = EchoProvider::new(vec![EchoProvider::tool_use(
        "call-1",
        "kubectl_scale_deployment",
        serde_json::json!({ "deployment_name": "frontend", "namespace": "production", "replicas": -3 }),
    )]);
    let (engine, store) = engine_with(provider);

    let outcome = engine.chat(None, "Scale frontend to -3.", model(), None).await.unwrap();

    assert!(outcome.pending_execution.is_none());
    assert!(store.list_pending().await.unwrap().is_empty());

    let result_status = outcome.tool_results.first().map(|r| r.llm_format());
    assert!(result_status.unwrap().to_lowercase().contains("replicas"));
}

#[tokio::test]
async fn expired_pending_cannot_be_approved() {
    let store = Arc::new(InMemoryStore::new());
    let pending_store: Arc<dyn PendingStore> = store.clone();

    let conversation_id = ConversationId::new();
    let stale = PendingExecution {
        execution_id: ExecutionId::new(),
        conversation_id,
        call_id: ToolCallId::new(),
        tool_name: "kubectl_scale_deployment".to_string(),
        parameters: serde_json::json!({ "deployment_name": "frontend", "namespace": "production", "replicas": 5 }),
        classification: Classification::Dangerous,
        created_at: Utc::now() - chrono::Duration::hours(2),
        status: PendingStatus::Pending,
    };
    let execution_id = stale.execution_id;
    pending_store.create(stale).await.unwrap();

    // Simulates what the background sweeper does once the TTL has elapsed.
    let expired = pending_store
        .transition(execution_id, PendingStatus::Expired)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(expired.status, PendingStatus::Expired);

    let conversation_store: Arc<dyn steward_core::store::ConversationStore> = store.clone();
    conversation_store
        .save(&steward_core::Conversation::new(
            conversation_id,
            steward_core::domain::derive_title("scale frontend"),
            Utc::now(),
        ))
        .await
        .unwrap();

    let audit_store: Arc<dyn AuditStore> = store.clone();
    let k8s: Arc<dyn K8sClient> = Arc::new(FakeK8sClient);
    let engine = Engine::new(
        Arc::new(Config::default()),
        conversation_store,
        pending_store,
        audit_store,
        k8s,
        Arc::new(EchoProvider::new(Vec::new())),
    );

    let err = engine.approve(execution_id, "alice", None, model()).await.unwrap_err();
    assert!(matches!(err, Error::AlreadyDecided(id) if id == execution_id));
}
