//! Calibration trajectory points.
//!
//! A trajectory point pairs one self-assessed vector score with the grounded
//! (evidence-derived) estimate of the same vector, for one work phase of one
//! session. Points are append-only; their phase tag is fixed when they are
//! created and is never reclassified if boundary detection later changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

/// The two independently calibrated halves of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkPhase {
    /// Investigation: from PREFLIGHT up to the accepted CHECK.
    Noetic,
    /// Action: from the accepted CHECK to POSTFLIGHT.
    Praxic,
}

impl WorkPhase {
    pub const ALL: [WorkPhase; 2] = [WorkPhase::Noetic, WorkPhase::Praxic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Noetic => "noetic",
            Self::Praxic => "praxic",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "noetic" => Some(Self::Noetic),
            "praxic" => Some(Self::Praxic),
            _ => None,
        }
    }
}

impl std::fmt::Display for WorkPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One persisted (self-assessed, grounded, gap) observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub id: Uuid,
    pub ai_id: String,
    pub session_id: String,
    pub phase: WorkPhase,
    pub vector_name: String,
    pub self_assessed: f64,
    /// Absent when no evidence was available for this vector.
    pub grounded: Option<f64>,
    /// `|self_assessed - grounded|`; present exactly when `grounded` is.
    pub gap: Option<f64>,
    pub domain: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl TrajectoryPoint {
    /// Create a point, computing `gap` from the two readings.
    ///
    /// Both readings must be finite numbers; evidence provenance is not checked.
    pub fn new(
        ai_id: impl Into<String>,
        session_id: impl Into<String>,
        phase: WorkPhase,
        vector_name: impl Into<String>,
        self_assessed: f64,
        grounded: Option<f64>,
    ) -> DomainResult<Self> {
        let vector_name = vector_name.into();
        if !self_assessed.is_finite() {
            return Err(DomainError::ValidationFailed(format!(
                "self_assessed for '{vector_name}' is not a finite number"
            )));
        }
        if grounded.is_some_and(|g| !g.is_finite()) {
            return Err(DomainError::ValidationFailed(format!(
                "grounded for '{vector_name}' is not a finite number"
            )));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            ai_id: ai_id.into(),
            session_id: session_id.into(),
            phase,
            vector_name,
            self_assessed,
            grounded,
            gap: grounded.map(|g| (self_assessed - g).abs()),
            domain: None,
            timestamp: Utc::now(),
        })
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Whether this point takes part in calibration aggregation.
    pub fn is_grounded(&self) -> bool {
        self.gap.is_some()
    }
}
