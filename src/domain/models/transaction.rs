//! Transaction events and the noetic/praxic phase boundary derived from them.
//!
//! A transaction (session) is bracketed by a PREFLIGHT and a POSTFLIGHT
//! self-assessment, with any number of CHECK assessments in between. Each
//! CHECK carries a decision: "proceed" closes the investigation (noetic)
//! phase and opens the action (praxic) phase, "investigate" loops back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::vectors::EpistemicVectors;
use crate::domain::errors::{DomainError, DomainResult};

/// Which assessment point of a transaction an event was recorded at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssessmentPhase {
    Preflight,
    Check,
    Postflight,
}

impl AssessmentPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preflight => "PREFLIGHT",
            Self::Check => "CHECK",
            Self::Postflight => "POSTFLIGHT",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PREFLIGHT" => Some(Self::Preflight),
            "CHECK" => Some(Self::Check),
            "POSTFLIGHT" => Some(Self::Postflight),
            _ => None,
        }
    }
}

/// Decision recorded on a CHECK event.
///
/// Any other decision string is opaque: the event still counts as a CHECK
/// but neither opens the praxic phase nor counts as an investigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckDecision {
    Proceed,
    Investigate,
}

impl CheckDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proceed => "proceed",
            Self::Investigate => "investigate",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "proceed" => Some(Self::Proceed),
            "investigate" => Some(Self::Investigate),
            _ => None,
        }
    }
}

/// Serialized body of a transaction event as stored in the event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPayload {
    pub vectors: EpistemicVectors,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<String>,
}

/// A row of the event log before its payload has been interpreted.
///
/// Kept separate from [`TransactionEvent`] so that readers can skip a single
/// corrupt row without failing the whole query. The timestamp stays as
/// stored until [`EventRecord::parse`].
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub id: String,
    pub session_id: String,
    pub phase: AssessmentPhase,
    /// RFC3339 text as stored.
    pub timestamp: String,
    /// Insertion order; breaks timestamp ties.
    pub sequence: i64,
    pub payload: String,
}

impl EventRecord {
    /// Interpret the row. Fails on an unparseable timestamp, a non-JSON
    /// payload, non-numeric vector scores or a non-string decision.
    pub fn parse(&self) -> DomainResult<TransactionEvent> {
        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| DomainError::MalformedEvent {
                id: self.id.clone(),
                reason: format!("timestamp '{}': {e}", self.timestamp),
            })?;
        let payload: EventPayload =
            serde_json::from_str(&self.payload).map_err(|e| DomainError::MalformedEvent {
                id: self.id.clone(),
                reason: e.to_string(),
            })?;

        Ok(TransactionEvent {
            id: self.id.clone(),
            session_id: self.session_id.clone(),
            phase: self.phase,
            timestamp,
            vectors: payload.vectors,
            decision: payload.decision,
        })
    }
}

/// An immutable epistemic self-assessment recorded during a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionEvent {
    pub id: String,
    pub session_id: String,
    pub phase: AssessmentPhase,
    pub timestamp: DateTime<Utc>,
    pub vectors: EpistemicVectors,
    /// Only meaningful on CHECK events.
    pub decision: Option<String>,
}

impl TransactionEvent {
    pub fn new(
        session_id: impl Into<String>,
        phase: AssessmentPhase,
        vectors: EpistemicVectors,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            phase,
            timestamp: Utc::now(),
            vectors,
            decision: None,
        }
    }

    pub fn preflight(session_id: impl Into<String>, vectors: EpistemicVectors) -> Self {
        Self::new(session_id, AssessmentPhase::Preflight, vectors)
    }

    pub fn check(
        session_id: impl Into<String>,
        vectors: EpistemicVectors,
        decision: CheckDecision,
    ) -> Self {
        Self::new(session_id, AssessmentPhase::Check, vectors)
            .with_decision(decision.as_str())
    }

    pub fn postflight(session_id: impl Into<String>, vectors: EpistemicVectors) -> Self {
        Self::new(session_id, AssessmentPhase::Postflight, vectors)
    }

    pub fn with_decision(mut self, decision: impl Into<String>) -> Self {
        self.decision = Some(decision.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// The decision if it is one of the recognised values.
    pub fn check_decision(&self) -> Option<CheckDecision> {
        self.decision.as_deref().and_then(CheckDecision::from_str)
    }

    pub fn payload(&self) -> EventPayload {
        EventPayload {
            vectors: self.vectors.clone(),
            decision: self.decision.clone(),
        }
    }
}

/// The noetic/praxic split of one session, derived from its events on demand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseBoundary {
    pub session_id: String,
    pub has_check: bool,
    pub preflight_vectors: Option<EpistemicVectors>,
    pub preflight_timestamp: Option<DateTime<Utc>>,
    /// Vectors at the last "proceed" CHECK, or at the last CHECK when the
    /// session never proceeded.
    pub proceed_vectors: Option<EpistemicVectors>,
    pub proceed_timestamp: Option<DateTime<Utc>>,
    pub postflight_vectors: Option<EpistemicVectors>,
    pub postflight_timestamp: Option<DateTime<Utc>>,
    pub noetic_only: bool,
    pub check_count: usize,
    pub investigate_count: usize,
}

impl PhaseBoundary {
    /// Build a boundary from already-parsed events.
    ///
    /// `checks` may be in any order; they are stably sorted by timestamp so
    /// equal timestamps keep their original order.
    pub fn from_events(
        session_id: impl Into<String>,
        preflight: Option<&TransactionEvent>,
        checks: &[TransactionEvent],
        postflight: Option<&TransactionEvent>,
    ) -> Self {
        let mut boundary = Self {
            session_id: session_id.into(),
            preflight_vectors: preflight.map(|e| e.vectors.clone()),
            preflight_timestamp: preflight.map(|e| e.timestamp),
            postflight_vectors: postflight.map(|e| e.vectors.clone()),
            postflight_timestamp: postflight.map(|e| e.timestamp),
            ..Self::default()
        };

        if checks.is_empty() {
            return boundary;
        }

        let mut ordered: Vec<&TransactionEvent> = checks.iter().collect();
        ordered.sort_by_key(|e| e.timestamp);

        let mut last_proceed: Option<&TransactionEvent> = None;
        for event in ordered.iter().copied() {
            match event.check_decision() {
                Some(CheckDecision::Proceed) => last_proceed = Some(event),
                Some(CheckDecision::Investigate) => boundary.investigate_count += 1,
                None => {}
            }
        }

        boundary.has_check = true;
        boundary.check_count = ordered.len();

        let endpoint = match last_proceed {
            Some(event) => event,
            None => {
                boundary.noetic_only = true;
                ordered[ordered.len() - 1]
            }
        };
        boundary.proceed_vectors = Some(endpoint.vectors.clone());
        boundary.proceed_timestamp = Some(endpoint.timestamp);

        boundary
    }

    /// True when the session crossed into action: a CHECK proceeded.
    pub fn has_praxic_phase(&self) -> bool {
        self.has_check && !self.noetic_only
    }

    /// Self-assessment that closes the investigation phase, if any.
    pub fn noetic_endpoint(&self) -> Option<&EpistemicVectors> {
        self.proceed_vectors.as_ref()
    }

    /// Self-assessment that closes the action phase. Only defined when the
    /// session has a praxic phase.
    pub fn praxic_endpoint(&self) -> Option<&EpistemicVectors> {
        if self.has_praxic_phase() {
            self.postflight_vectors.as_ref()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::vectors::KNOW;
    use chrono::Duration;

    fn vectors(know: f64) -> EpistemicVectors {
        EpistemicVectors::new().with(KNOW, know)
    }

    fn check_at(secs: i64, know: f64, decision: &str) -> TransactionEvent {
        let base = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        TransactionEvent::new("s1", AssessmentPhase::Check, vectors(know))
            .with_decision(decision)
            .with_timestamp(base + Duration::seconds(secs))
    }

    #[test]
    fn test_phase_string_round_trip() {
        for phase in [
            AssessmentPhase::Preflight,
            AssessmentPhase::Check,
            AssessmentPhase::Postflight,
        ] {
            assert_eq!(AssessmentPhase::from_str(phase.as_str()), Some(phase));
        }
        assert_eq!(AssessmentPhase::from_str("check"), Some(AssessmentPhase::Check));
        assert_eq!(AssessmentPhase::from_str("midflight"), None);
    }

    #[test]
    fn test_unknown_decision_is_opaque() {
        let event = check_at(0, 0.5, "maybe");
        assert_eq!(event.check_decision(), None);
        assert_eq!(
            check_at(0, 0.5, " Proceed ").check_decision(),
            Some(CheckDecision::Proceed)
        );
    }

    #[test]
    fn test_parse_rejects_non_string_decision() {
        let record = EventRecord {
            id: "e1".into(),
            session_id: "s1".into(),
            phase: AssessmentPhase::Check,
            timestamp: "2026-06-01T08:00:00.000000Z".into(),
            sequence: 1,
            payload: r#"{"vectors": {"know": 0.5}, "decision": 42}"#.into(),
        };
        assert!(matches!(
            record.parse(),
            Err(DomainError::MalformedEvent { .. })
        ));
    }

    #[test]
    fn test_parse_accepts_missing_decision() {
        let record = EventRecord {
            id: "e1".into(),
            session_id: "s1".into(),
            phase: AssessmentPhase::Preflight,
            timestamp: "2026-06-01T08:00:00.000000Z".into(),
            sequence: 1,
            payload: r#"{"vectors": {"know": 0.5, "uncertainty": 0.4}}"#.into(),
        };
        let event = record.parse().unwrap();
        assert_eq!(event.decision, None);
        assert_eq!(event.vectors.uncertainty(), Some(0.4));
    }

    #[test]
    fn test_parse_rejects_unreadable_timestamp() {
        let record = EventRecord {
            id: "e2".into(),
            session_id: "s1".into(),
            phase: AssessmentPhase::Check,
            timestamp: "not-a-time".into(),
            sequence: 2,
            payload: r#"{"vectors": {"know": 0.5}, "decision": "proceed"}"#.into(),
        };
        match record.parse() {
            Err(DomainError::MalformedEvent { id, reason }) => {
                assert_eq!(id, "e2");
                assert!(reason.contains("not-a-time"));
            }
            other => panic!("expected malformed event, got {other:?}"),
        }
    }

    #[test]
    fn test_boundary_without_checks() {
        let pre = TransactionEvent::preflight("s1", vectors(0.4));
        let boundary = PhaseBoundary::from_events("s1", Some(&pre), &[], None);

        assert!(!boundary.has_check);
        assert_eq!(boundary.preflight_vectors, Some(vectors(0.4)));
        assert!(boundary.proceed_vectors.is_none());
        assert!(boundary.proceed_timestamp.is_none());
        assert!(!boundary.noetic_only);
        assert_eq!(boundary.check_count, 0);
        assert_eq!(boundary.investigate_count, 0);
        assert!(!boundary.has_praxic_phase());
    }

    #[test]
    fn test_boundary_uses_last_proceed() {
        let checks = vec![
            check_at(1, 0.5, "proceed"),
            check_at(2, 0.6, "investigate"),
            check_at(3, 0.8, "proceed"),
            check_at(4, 0.7, "investigate"),
        ];
        let boundary = PhaseBoundary::from_events("s1", None, &checks, None);

        assert_eq!(boundary.proceed_vectors, Some(vectors(0.8)));
        assert_eq!(boundary.check_count, 4);
        assert_eq!(boundary.investigate_count, 2);
        assert!(!boundary.noetic_only);
    }

    #[test]
    fn test_boundary_sorts_checks_stably() {
        // Out of order input; two events share the latest timestamp.
        let checks = vec![
            check_at(5, 0.9, "investigate"),
            check_at(1, 0.2, "investigate"),
            check_at(5, 0.3, "investigate"),
        ];
        let boundary = PhaseBoundary::from_events("s1", None, &checks, None);

        assert!(boundary.noetic_only);
        // Last in time, ties resolved by original order.
        assert_eq!(boundary.proceed_vectors, Some(vectors(0.3)));
    }

    #[test]
    fn test_praxic_endpoint_requires_proceed() {
        let post = TransactionEvent::postflight("s1", vectors(0.9));
        let noetic = PhaseBoundary::from_events(
            "s1",
            None,
            &[check_at(1, 0.5, "investigate")],
            Some(&post),
        );
        assert!(noetic.praxic_endpoint().is_none());

        let praxic =
            PhaseBoundary::from_events("s1", None, &[check_at(1, 0.5, "proceed")], Some(&post));
        assert_eq!(praxic.praxic_endpoint(), Some(&vectors(0.9)));
        assert_eq!(praxic.noetic_endpoint(), Some(&vectors(0.5)));
    }
}
