use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::{AuditRecord, AuditStatus, PendingStatus};

use super::{AuditStore, PendingStore};

/// Background task spawned once at startup: every 60s (spec Testable
/// Property 3), transitions expired `PendingExecution`s and prunes
/// `AuditRecord`s older than 30 days. Runs against whichever backing store
/// was configured — pending executions always live in the in-memory tier
/// (see DESIGN.md), audit may be in-memory or sqlite.
pub fn spawn(
    pending_store: Arc<dyn PendingStore>,
    audit_store: Arc<dyn AuditStore>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            sweep_once(&pending_store, &audit_store).await;
        }
    })
}

async fn sweep_once(pending_store: &Arc<dyn PendingStore>, audit_store: &Arc<dyn AuditStore>) {
    let now = Utc::now();

    match pending_store.list_expired(now).await {
        Ok(expired) => {
            for pending in expired {
                match pending_store
                    .transition(pending.execution_id, PendingStatus::Expired)
                    .await
                {
                    Ok(_) => {
                        let (size, preview) = AuditRecord::preview("expired before decision");
                        let record = AuditRecord {
                            execution_id: pending.execution_id,
                            conversation_id: pending.conversation_id,
                            tool_name: pending.tool_name,
                            parameters: pending.parameters,
                            approver: None,
                            status: AuditStatus::Expired,
                            requested_at: pending.created_at,
                            decided_at: Some(now),
                            completed_at: Some(now),
                            result_size: size,
                            result_preview: preview,
                        };
                        if let Err(e) = audit_store.append(record).await {
                            warn!(error = %e, "failed to audit expired execution");
                        }
                    }
                    Err(e) => warn!(error = %e, "failed to expire pending execution"),
                }
            }
        }
        Err(e) => warn!(error = %e, "failed to list expired pending executions"),
    }

    let cutoff = now - chrono::Duration::days(30);
    match audit_store.prune_older_than(cutoff).await {
        Ok(0) => {}
        Ok(n) => info!(pruned = n, "pruned expired audit records"),
        Err(e) => warn!(error = %e, "failed to prune audit log"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConversationId, ExecutionId, PendingExecution, ToolCallId};
    use crate::store::InMemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn sweep_expires_stale_pending_and_audits_it() {
        let store = Arc::new(InMemoryStore::new());
        let pending_store: Arc<dyn PendingStore> = store.clone();
        let audit_store: Arc<dyn AuditStore> = store.clone();

        let stale = PendingExecution {
            execution_id: ExecutionId::new(),
            conversation_id: ConversationId::new(),
            call_id: ToolCallId::new(),
            tool_name: "kubectl_delete_pod".into(),
            parameters: serde_json::json!({}),
            classification: steward_tools::Classification::Dangerous,
            created_at: Utc::now() - chrono::Duration::hours(2),
            status: PendingStatus::Pending,
        };
        let id = stale.execution_id;
        pending_store.create(stale).await.unwrap();

        sweep_once(&pending_store, &audit_store).await;

        let after = pending_store.get(id).await.unwrap().unwrap();
        assert_eq!(after.status, PendingStatus::Expired);
        let audit = audit_store.list(10).await.unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].status, AuditStatus::Expired);
    }
}
