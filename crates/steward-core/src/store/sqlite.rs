use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use crate::domain::{AuditRecord, Conversation, ConversationId};
use crate::error::{Error, Result};

use super::{AuditStore, ConversationStore, ConversationSummary};

/// Durable tier for conversations and the audit log, backed by `sqlx`
/// (sqlite, `runtime-tokio-rustls`, `migrate`, `json`, `chrono`). Pending
/// executions are intentionally NOT stored here — see
/// `store::InMemoryStore` and the Open Question resolution in DESIGN.md.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
            Error::Config(format!("failed to run migrations: {e}"))
        })?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ConversationStore for SqliteStore {
    async fn load(&self, id: ConversationId) -> Result<Option<Conversation>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT blob FROM conversations WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        Ok(row
            .map(|(blob,)| serde_json::from_str(&blob))
            .transpose()
            .map_err(|e| Error::Config(format!("corrupt conversation blob: {e}")))?)
    }

    async fn save(&self, conversation: &Conversation) -> Result<()> {
        let blob = serde_json::to_string(conversation)
            .map_err(|e| Error::Config(format!("failed to serialize conversation: {e}")))?;
        sqlx::query(
            "INSERT INTO conversations (id, title, last_updated, blob) VALUES (?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET title = excluded.title, last_updated = excluded.last_updated, blob = excluded.blob",
        )
        .bind(conversation.id.to_string())
        .bind(&conversation.title)
        .bind(conversation.last_updated.to_rfc3339())
        .bind(blob)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: ConversationId) -> Result<()> {
        sqlx::query("DELETE FROM conversations WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ConversationSummary>> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT id, blob FROM conversations ORDER BY last_updated DESC")
                .fetch_all(&self.pool)
                .await?;
        let mut summaries = Vec::with_capacity(rows.len());
        for (_, blob) in rows {
            let conv: Conversation = serde_json::from_str(&blob)
                .map_err(|e| Error::Config(format!("corrupt conversation blob: {e}")))?;
            summaries.push(ConversationSummary {
                id: conv.id,
                title: conv.title,
                message_count: conv.turns.len(),
                last_updated: conv.last_updated,
            });
        }
        Ok(summaries)
    }
}

#[async_trait]
impl AuditStore for SqliteStore {
    async fn append(&self, record: AuditRecord) -> Result<()> {
        let blob = serde_json::to_string(&record)
            .map_err(|e| Error::Config(format!("failed to serialize audit record: {e}")))?;
        sqlx::query(
            "INSERT INTO audit_log (execution_id, conversation_id, requested_at, blob) VALUES (?, ?, ?, ?)
             ON CONFLICT(execution_id) DO NOTHING",
        )
        .bind(record.execution_id.to_string())
        .bind(record.conversation_id.to_string())
        .bind(record.requested_at.to_rfc3339())
        .bind(blob)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(&self, limit: usize) -> Result<Vec<AuditRecord>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT blob FROM audit_log ORDER BY requested_at DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|(blob,)| {
                serde_json::from_str(&blob)
                    .map_err(|e| Error::Config(format!("corrupt audit record: {e}")))
            })
            .collect()
    }

    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM audit_log WHERE requested_at < ?")
            .bind(cutoff.to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::derive_title;

    async fn temp_store() -> (SqliteStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("steward-test.db");
        let url = format!("sqlite://{}?mode=rwc", path.display());
        let store = SqliteStore::connect(&url).await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn round_trips_a_conversation() {
        let (store, _dir) = temp_store().await;
        let conv = Conversation::new(ConversationId::new(), derive_title("hi"), Utc::now());
        store.save(&conv).await.unwrap();
        let loaded = store.load(conv.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, conv.id);
    }

    #[tokio::test]
    async fn list_orders_by_recency() {
        let (store, _dir) = temp_store().await;
        let older = Conversation::new(ConversationId::new(), "older".into(), Utc::now() - chrono::Duration::hours(1));
        let newer = Conversation::new(ConversationId::new(), "newer".into(), Utc::now());
        store.save(&older).await.unwrap();
        store.save(&newer).await.unwrap();
        let list = store.list().await.unwrap();
        assert_eq!(list[0].title, "newer");
    }
}
