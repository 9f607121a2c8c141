//! Phase boundary detection.
//!
//! Reconstructs where a session's investigation (noetic) phase ended and its
//! action (praxic) phase began, from the PREFLIGHT/CHECK/POSTFLIGHT events in
//! the transaction log.
//!
//! Detection feeds the background calibration path, never a user-facing
//! gate, so it does not fail: storage errors and corrupt rows are logged and
//! the boundary is built from whatever could be read.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::models::{AssessmentPhase, EventRecord, PhaseBoundary, TransactionEvent};
use crate::domain::ports::TransactionEventRepository;

pub struct PhaseBoundaryDetector<E: TransactionEventRepository> {
    events: Arc<E>,
}

impl<E: TransactionEventRepository> PhaseBoundaryDetector<E> {
    pub fn new(events: Arc<E>) -> Self {
        Self { events }
    }

    /// Derive the phase boundary of a session.
    ///
    /// Read-only and deterministic for a given event log.
    pub async fn detect(&self, session_id: &str) -> PhaseBoundary {
        let preflights = self.load(session_id, AssessmentPhase::Preflight).await;
        let checks = self.load(session_id, AssessmentPhase::Check).await;
        let postflights = self.load(session_id, AssessmentPhase::Postflight).await;

        let boundary = PhaseBoundary::from_events(
            session_id,
            latest(&preflights),
            &checks,
            latest(&postflights),
        );

        debug!(
            session_id,
            has_check = boundary.has_check,
            noetic_only = boundary.noetic_only,
            check_count = boundary.check_count,
            investigate_count = boundary.investigate_count,
            "phase boundary detected"
        );

        boundary
    }

    /// Parsed events of one phase in log order. Unreadable input yields
    /// fewer (or no) events rather than an error.
    async fn load(&self, session_id: &str, phase: AssessmentPhase) -> Vec<TransactionEvent> {
        match self.events.events_for_session(session_id, phase).await {
            Ok(records) => parse_records(&records),
            Err(err) => {
                warn!(
                    session_id,
                    phase = phase.as_str(),
                    error = %err,
                    "failed to read transaction events; continuing without them"
                );
                Vec::new()
            }
        }
    }
}

/// Most recent event; on equal timestamps the later one in log order.
fn latest(events: &[TransactionEvent]) -> Option<&TransactionEvent> {
    events.iter().max_by_key(|e| e.timestamp)
}

fn parse_records(records: &[EventRecord]) -> Vec<TransactionEvent> {
    records
        .iter()
        .filter_map(|record| match record.parse() {
            Ok(event) => Some(event),
            Err(err) => {
                warn!(
                    event_id = %record.id,
                    session_id = %record.session_id,
                    error = %err,
                    "skipping malformed transaction event"
                );
                None
            }
        })
        .collect()
}
