//! Storage failures never reach the gate consumer: every failure mode
//! resolves to the static, floor-respecting thresholds.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{at, setup_test_logging, test_store, vectors};
use epistemic_calibration::domain::models::{EventRecord, STORAGE_TIMEOUT};
use epistemic_calibration::{
    AssessmentPhase, CalibrationConfig, CheckDecision, DomainError, DomainResult,
    DynamicThresholdCalculator, PhaseBoundaryDetector, ThresholdSource, TrajectoryPoint,
    TrajectoryRepository, TransactionEvent, TransactionEventRepository, WorkPhase,
};

/// Trajectory store whose reads fail, hang, or succeed depending on phase.
struct ScriptedTrajectories {
    noetic: Behaviour,
    praxic: Behaviour,
    calls: AtomicUsize,
}

#[derive(Clone, Copy)]
enum Behaviour {
    Empty,
    Fail,
    Hang,
}

impl ScriptedTrajectories {
    fn new(noetic: Behaviour, praxic: Behaviour) -> Self {
        Self {
            noetic,
            praxic,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TrajectoryRepository for ScriptedTrajectories {
    async fn append(&self, _point: &TrajectoryPoint) -> DomainResult<()> {
        Ok(())
    }

    async fn recent_grounded(
        &self,
        _ai_id: &str,
        phase: WorkPhase,
        _limit: usize,
    ) -> DomainResult<Vec<TrajectoryPoint>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let behaviour = match phase {
            WorkPhase::Noetic => self.noetic,
            WorkPhase::Praxic => self.praxic,
        };
        match behaviour {
            Behaviour::Empty => Ok(Vec::new()),
            Behaviour::Fail => Err(DomainError::DatabaseError("connection reset".to_string())),
            Behaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Vec::new())
            }
        }
    }

    async fn by_session(&self, _session_id: &str) -> DomainResult<Vec<TrajectoryPoint>> {
        Ok(Vec::new())
    }
}

fn assert_full_static(thresholds: &epistemic_calibration::ThresholdSet, config: &CalibrationConfig) {
    assert_eq!(thresholds.source, ThresholdSource::Static);
    for phase in WorkPhase::ALL {
        let phase = thresholds.for_phase(phase);
        assert_eq!(phase.ready_know_threshold, config.base_know_threshold);
        assert_eq!(phase.ready_uncertainty_threshold, config.base_uncertainty_threshold);
        assert!(phase.calibration_accuracy.is_none());
    }
}

#[tokio::test]
async fn test_one_failing_phase_fails_the_whole_set() {
    setup_test_logging();
    let config = CalibrationConfig::default();
    let repo = Arc::new(ScriptedTrajectories::new(Behaviour::Empty, Behaviour::Fail));
    let calculator = DynamicThresholdCalculator::new(repo.clone(), config.clone());

    let fallback = calculator.try_compute_thresholds("agent-x").await.unwrap_err();
    assert!(fallback.diagnostic.contains("connection reset"));
    assert_full_static(&fallback.thresholds, &config);

    let thresholds = calculator.compute_thresholds("agent-x").await;
    assert_full_static(&thresholds, &config);
    assert!(thresholds.reason.unwrap().starts_with("storage error"));
}

#[tokio::test(start_paused = true)]
async fn test_hanging_storage_times_out() {
    let config = CalibrationConfig {
        query_timeout_ms: 200,
        ..CalibrationConfig::default()
    };
    let repo = Arc::new(ScriptedTrajectories::new(Behaviour::Hang, Behaviour::Empty));
    let calculator = DynamicThresholdCalculator::new(repo.clone(), config.clone());

    let thresholds = calculator.compute_thresholds("agent-x").await;
    assert_full_static(&thresholds, &config);
    assert_eq!(thresholds.reason.as_deref(), Some(STORAGE_TIMEOUT));
    assert_eq!(repo.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_fallback_respects_custom_base_thresholds() {
    let config = CalibrationConfig {
        base_know_threshold: 0.8,
        base_uncertainty_threshold: 0.3,
        ..CalibrationConfig::default()
    };
    let repo = Arc::new(ScriptedTrajectories::new(Behaviour::Fail, Behaviour::Fail));
    let calculator = DynamicThresholdCalculator::new(repo, config.clone());

    let thresholds = calculator.compute_thresholds("agent-x").await;
    assert_full_static(&thresholds, &config);
    assert_eq!(thresholds.noetic.ready_know_threshold, 0.8);
}

/// Event log that cannot be read at all.
struct UnreadableEvents;

#[async_trait]
impl TransactionEventRepository for UnreadableEvents {
    async fn append(&self, _event: &TransactionEvent) -> DomainResult<()> {
        Err(DomainError::DatabaseError("read-only".to_string()))
    }

    async fn events_for_session(
        &self,
        _session_id: &str,
        _phase: AssessmentPhase,
    ) -> DomainResult<Vec<EventRecord>> {
        Err(DomainError::DatabaseError("database disk image is malformed".to_string()))
    }
}

#[tokio::test]
async fn test_unreadable_event_log_yields_empty_boundary() {
    let boundary = PhaseBoundaryDetector::new(Arc::new(UnreadableEvents))
        .detect("session-x")
        .await;

    assert_eq!(boundary.session_id, "session-x");
    assert!(!boundary.has_check);
    assert!(boundary.preflight_vectors.is_none());
    assert!(boundary.proceed_vectors.is_none());
}

#[tokio::test]
async fn test_unknown_decision_strings_are_counted_but_ignored() {
    let store = test_store().await;
    store
        .events
        .append(&TransactionEvent::check("s", vectors(0.6, 0.4), CheckDecision::Proceed).with_timestamp(at(1)))
        .await
        .unwrap();
    store
        .events
        .append(
            &TransactionEvent::new("s", AssessmentPhase::Check, vectors(0.2, 0.9))
                .with_decision("escalate")
                .with_timestamp(at(2)),
        )
        .await
        .unwrap();

    let boundary = PhaseBoundaryDetector::new(store.events.clone()).detect("s").await;

    assert_eq!(boundary.check_count, 2);
    assert_eq!(boundary.investigate_count, 0);
    assert_eq!(boundary.proceed_vectors, Some(vectors(0.6, 0.4)));
    assert!(boundary.has_praxic_phase());
}
