//! Transaction event log port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{AssessmentPhase, EventRecord, TransactionEvent};

/// Repository interface for the append-only transaction event log.
///
/// Reads return raw [`EventRecord`]s so a corrupt payload affects only its
/// own row; callers decide whether to skip or surface it.
#[async_trait]
pub trait TransactionEventRepository: Send + Sync {
    /// Append an event. Events are never updated or deleted.
    async fn append(&self, event: &TransactionEvent) -> DomainResult<()>;

    /// All events of one phase for a session, ordered by timestamp ascending
    /// with ties in insertion order.
    async fn events_for_session(
        &self,
        session_id: &str,
        phase: AssessmentPhase,
    ) -> DomainResult<Vec<EventRecord>>;
}
