use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::{
    AuditRecord, Conversation, ConversationId, ExecutionId, PendingExecution, PendingStatus,
};
use crate::error::Result;

use super::{AuditStore, ConversationStore, ConversationSummary, PendingStore};

/// RwLock-guarded `HashMap`s. Default for tests and the CLI's ephemeral
/// mode. Conversation-level serialization lives in `Engine`'s own lock
/// registry, not here.
#[derive(Default)]
pub struct InMemoryStore {
    conversations: RwLock<HashMap<ConversationId, Conversation>>,
    pending: RwLock<HashMap<ExecutionId, PendingExecution>>,
    audit: RwLock<HashMap<ExecutionId, AuditRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    async fn load(&self, id: ConversationId) -> Result<Option<Conversation>> {
        Ok(self.conversations.read().await.get(&id).cloned())
    }

    async fn save(&self, conversation: &Conversation) -> Result<()> {
        self.conversations
            .write()
            .await
            .insert(conversation.id, conversation.clone());
        Ok(())
    }

    async fn delete(&self, id: ConversationId) -> Result<()> {
        self.conversations.write().await.remove(&id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ConversationSummary>> {
        let mut summaries: Vec<_> = self
            .conversations
            .read()
            .await
            .values()
            .map(|c| ConversationSummary {
                id: c.id,
                title: c.title.clone(),
                message_count: c.message_count(),
                last_updated: c.last_updated,
            })
            .collect();
        summaries.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        Ok(summaries)
    }
}

#[async_trait]
impl PendingStore for InMemoryStore {
    async fn create(&self, pending: PendingExecution) -> Result<()> {
        self.pending.write().await.insert(pending.execution_id, pending);
        Ok(())
    }

    async fn get(&self, id: ExecutionId) -> Result<Option<PendingExecution>> {
        Ok(self.pending.read().await.get(&id).cloned())
    }

    async fn transition(
        &self,
        id: ExecutionId,
        new_status: PendingStatus,
    ) -> Result<Option<PendingExecution>> {
        let mut guard = self.pending.write().await;
        let Some(entry) = guard.get_mut(&id) else {
            return Ok(None);
        };
        if entry.status.is_terminal() {
            return Ok(Some(entry.clone()));
        }
        entry.status = new_status;
        Ok(Some(entry.clone()))
    }

    async fn list_pending(&self) -> Result<Vec<PendingExecution>> {
        Ok(self
            .pending
            .read()
            .await
            .values()
            .filter(|p| p.status == PendingStatus::Pending)
            .cloned()
            .collect())
    }

    async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<PendingExecution>> {
        Ok(self
            .pending
            .read()
            .await
            .values()
            .filter(|p| p.is_expired(now))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AuditStore for InMemoryStore {
    async fn append(&self, record: AuditRecord) -> Result<()> {
        self.audit.write().await.insert(record.execution_id, record);
        Ok(())
    }

    async fn list(&self, limit: usize) -> Result<Vec<AuditRecord>> {
        let mut records: Vec<_> = self.audit.read().await.values().cloned().collect();
        records.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
        records.truncate(limit);
        Ok(records)
    }

    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut guard = self.audit.write().await;
        let before = guard.len();
        guard.retain(|_, record| record.requested_at >= cutoff);
        Ok((before - guard.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::derive_title;

    #[tokio::test]
    async fn round_trips_a_conversation() {
        let store = InMemoryStore::new();
        let conv = Conversation::new(ConversationId::new(), derive_title("hello"), Utc::now());
        store.save(&conv).await.unwrap();
        let loaded = store.load(conv.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, conv.id);
        assert_eq!(loaded.title, conv.title);
    }

    #[tokio::test]
    async fn pending_transition_is_terminal_once_decided() {
        let store = InMemoryStore::new();
        let pending = PendingExecution {
            execution_id: ExecutionId::new(),
            conversation_id: ConversationId::new(),
            call_id: crate::domain::ToolCallId::new(),
            tool_name: "kubectl_delete_pod".into(),
            parameters: serde_json::json!({}),
            classification: steward_tools::Classification::Dangerous,
            created_at: Utc::now(),
            status: PendingStatus::Pending,
        };
        let id = pending.execution_id;
        store.create(pending).await.unwrap();

        let approved = store.transition(id, PendingStatus::Approved).await.unwrap().unwrap();
        assert_eq!(approved.status, PendingStatus::Approved);

        let unchanged = store.transition(id, PendingStatus::Rejected).await.unwrap().unwrap();
        assert_eq!(unchanged.status, PendingStatus::Approved);
    }
}
