//! Trajectory recording.
//!
//! Turns a finished session into trajectory points: every self-assessed
//! vector at a phase endpoint is paired with its grounded estimate and
//! appended to the trajectory store. Grounded estimates are produced
//! elsewhere; this module only pairs, validates and persists.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::phase_boundary::PhaseBoundaryDetector;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{EpistemicVectors, PhaseBoundary, TrajectoryPoint, WorkPhase};
use crate::domain::ports::{TrajectoryRepository, TransactionEventRepository};

/// Evidence-derived vector estimates for one session, split by phase.
///
/// Vectors with no estimate are simply absent; the matching trajectory
/// points are still written, with no grounded value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundedAssessment {
    pub noetic: EpistemicVectors,
    pub praxic: EpistemicVectors,
    pub domain: Option<String>,
}

impl GroundedAssessment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_noetic(mut self, vectors: EpistemicVectors) -> Self {
        self.noetic = vectors;
        self
    }

    pub fn with_praxic(mut self, vectors: EpistemicVectors) -> Self {
        self.praxic = vectors;
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn for_phase(&self, phase: WorkPhase) -> &EpistemicVectors {
        match phase {
            WorkPhase::Noetic => &self.noetic,
            WorkPhase::Praxic => &self.praxic,
        }
    }
}

pub struct TrajectoryRecorder<E: TransactionEventRepository, T: TrajectoryRepository> {
    detector: PhaseBoundaryDetector<E>,
    trajectories: Arc<T>,
}

impl<E: TransactionEventRepository, T: TrajectoryRepository> TrajectoryRecorder<E, T> {
    pub fn new(events: Arc<E>, trajectories: Arc<T>) -> Self {
        Self {
            detector: PhaseBoundaryDetector::new(events),
            trajectories,
        }
    }

    /// Validate and append a single point.
    pub async fn record_point(&self, point: &TrajectoryPoint) -> DomainResult<()> {
        validate_point(point)?;
        self.trajectories.append(point).await
    }

    /// Record the trajectory of a finished session.
    ///
    /// The noetic phase is scored at the proceed CHECK (or the last CHECK
    /// of a session that never proceeded); the praxic phase at POSTFLIGHT,
    /// and only when the session actually proceeded. Every point is
    /// validated before any is written and the batch is stored as one
    /// unit, so a failed call leaves nothing behind. Returns the points
    /// written, noetic first, canonical vectors in reporting order.
    pub async fn record_session(
        &self,
        ai_id: &str,
        session_id: &str,
        grounded: &GroundedAssessment,
    ) -> DomainResult<Vec<TrajectoryPoint>> {
        let boundary = self.detector.detect(session_id).await;

        let mut points = Vec::new();
        for phase in WorkPhase::ALL {
            let Some(endpoint) = endpoint(&boundary, phase) else {
                debug!(session_id, phase = phase.as_str(), "no self-assessment endpoint; phase skipped");
                continue;
            };

            let estimates = grounded.for_phase(phase);
            for (name, self_assessed) in endpoint.iter_reporting_order() {
                let mut point = TrajectoryPoint::new(
                    ai_id,
                    session_id,
                    phase,
                    name,
                    self_assessed,
                    estimates.get(name),
                )?;
                if let Some(domain) = &grounded.domain {
                    point = point.with_domain(domain.clone());
                }
                validate_point(&point)?;
                points.push(point);
            }
        }

        if !points.is_empty() {
            self.trajectories.append_all(&points).await?;
        }

        info!(
            ai_id,
            session_id,
            points = points.len(),
            grounded = points.iter().filter(|p| p.is_grounded()).count(),
            "session trajectory recorded"
        );

        Ok(points)
    }
}

fn endpoint(boundary: &PhaseBoundary, phase: WorkPhase) -> Option<&EpistemicVectors> {
    match phase {
        WorkPhase::Noetic => boundary.noetic_endpoint(),
        WorkPhase::Praxic => boundary.praxic_endpoint(),
    }
}

fn validate_point(point: &TrajectoryPoint) -> DomainResult<()> {
    if !point.self_assessed.is_finite() {
        return Err(DomainError::ValidationFailed(format!(
            "self_assessed for '{}' is not a finite number",
            point.vector_name
        )));
    }

    match (point.grounded, point.gap) {
        (None, None) => Ok(()),
        (Some(grounded), Some(gap)) if grounded.is_finite() && gap.is_finite() => Ok(()),
        (Some(_), Some(_)) => Err(DomainError::ValidationFailed(format!(
            "grounded reading for '{}' is not a finite number",
            point.vector_name
        ))),
        _ => Err(DomainError::ValidationFailed(format!(
            "gap for '{}' must be present exactly when grounded is",
            point.vector_name
        ))),
    }
}
