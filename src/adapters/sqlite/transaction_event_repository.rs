//! SQLite implementation of the TransactionEventRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::format_datetime;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AssessmentPhase, EventRecord, TransactionEvent};
use crate::domain::ports::TransactionEventRepository;

/// SQLite-backed transaction event log.
#[derive(Clone)]
pub struct SqliteTransactionEventRepository {
    pool: SqlitePool,
}

impl SqliteTransactionEventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionEventRepository for SqliteTransactionEventRepository {
    async fn append(&self, event: &TransactionEvent) -> DomainResult<()> {
        let payload = serde_json::to_string(&event.payload())?;

        sqlx::query(
            r#"
            INSERT INTO transaction_events (id, session_id, phase, timestamp, payload)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&event.id)
        .bind(&event.session_id)
        .bind(event.phase.as_str())
        .bind(format_datetime(&event.timestamp))
        .bind(payload)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn events_for_session(
        &self,
        session_id: &str,
        phase: AssessmentPhase,
    ) -> DomainResult<Vec<EventRecord>> {
        let rows: Vec<EventRow> = sqlx::query_as(
            r#"
            SELECT sequence, id, session_id, phase, timestamp, payload
            FROM transaction_events
            WHERE session_id = ? AND phase = ?
            ORDER BY timestamp ASC, sequence ASC
            "#,
        )
        .bind(session_id)
        .bind(phase.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(EventRecord::try_from).collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    sequence: i64,
    id: String,
    session_id: String,
    phase: String,
    timestamp: String,
    payload: String,
}

impl TryFrom<EventRow> for EventRecord {
    type Error = DomainError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let phase = AssessmentPhase::from_str(&row.phase).ok_or_else(|| {
            DomainError::SerializationError(format!("Invalid assessment phase: {}", row.phase))
        })?;

        Ok(EventRecord {
            id: row.id,
            session_id: row.session_id,
            phase,
            timestamp: row.timestamp,
            sequence: row.sequence,
            payload: row.payload,
        })
    }
}
