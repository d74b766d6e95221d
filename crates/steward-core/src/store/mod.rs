pub mod memory;
pub mod sqlite;
pub mod sweeper;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{AuditRecord, Conversation, ConversationId, ExecutionId, PendingExecution};
use crate::error::Result;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

/// Summary row for `list conversations`, sorted by recency.
#[derive(Debug, Clone)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub title: String,
    pub message_count: usize,
    pub last_updated: DateTime<Utc>,
}

#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn load(&self, id: ConversationId) -> Result<Option<Conversation>>;
    async fn save(&self, conversation: &Conversation) -> Result<()>;
    async fn delete(&self, id: ConversationId) -> Result<()>;
    async fn list(&self) -> Result<Vec<ConversationSummary>>;
}

#[async_trait]
pub trait PendingStore: Send + Sync {
    async fn create(&self, pending: PendingExecution) -> Result<()>;
    async fn get(&self, id: ExecutionId) -> Result<Option<PendingExecution>>;
    /// Atomic compare-and-set: succeeds only if the stored record is still
    /// in `Pending`. Returns the updated record, or `None` if the id is
    /// unknown, or `Err` is never used for "already decided" — callers
    /// compare the returned status to the one they expected.
    async fn transition(
        &self,
        id: ExecutionId,
        new_status: crate::domain::PendingStatus,
    ) -> Result<Option<PendingExecution>>;
    async fn list_pending(&self) -> Result<Vec<PendingExecution>>;
    /// All records still in `Pending` older than their TTL, for the sweeper.
    async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<PendingExecution>>;
}

#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append(&self, record: AuditRecord) -> Result<()>;
    async fn list(&self, limit: usize) -> Result<Vec<AuditRecord>>;
    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}
