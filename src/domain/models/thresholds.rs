//! Gate thresholds derived from calibration history.
//!
//! Better calibrated agents earn a lower knowledge bar and a higher
//! uncertainty tolerance. Every threshold is bounded by safety floors that
//! no amount of calibration history can cross.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::calibration::CalibrationSummary;
use super::config::CalibrationConfig;
use super::trajectory::WorkPhase;

/// Reason reported when no phase had enough history for adjustment.
pub const INSUFFICIENT_DATA: &str = "insufficient data";

/// Reason reported when a storage query exceeded its deadline.
pub const STORAGE_TIMEOUT: &str = "storage timeout";

/// Round to three decimal places.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Whether any earned-autonomy adjustment is in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdSource {
    Dynamic,
    Static,
}

impl ThresholdSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dynamic => "dynamic",
            Self::Static => "static",
        }
    }
}

/// Thresholds for one work phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseThresholds {
    pub ready_know_threshold: f64,
    pub ready_uncertainty_threshold: f64,
    /// `None` when the phase fell back to the base thresholds.
    pub calibration_accuracy: Option<f64>,
    pub transactions_analyzed: usize,
}

impl PhaseThresholds {
    /// Base thresholds, untouched apart from the safety clamp. A validated
    /// configuration already sits inside the floors, so this is the base
    /// value exactly.
    pub fn base(config: &CalibrationConfig, transactions_analyzed: usize) -> Self {
        Self {
            ready_know_threshold: config.base_know_threshold.max(config.know_floor),
            ready_uncertainty_threshold: config
                .base_uncertainty_threshold
                .min(config.uncertainty_ceiling),
            calibration_accuracy: None,
            transactions_analyzed,
        }
    }

    /// Thresholds adjusted by a calibration accuracy in `[0, 1]`.
    pub fn adjusted(config: &CalibrationConfig, accuracy: f64, transactions_analyzed: usize) -> Self {
        let accuracy = accuracy.clamp(0.0, 1.0);
        let shift = accuracy * config.autonomy_factor;

        let know = (config.base_know_threshold - shift).max(config.know_floor);
        let uncertainty = (config.base_uncertainty_threshold + shift).min(config.uncertainty_ceiling);

        // Clamp again after rounding: a floor with more than three decimals
        // must not be rounded past.
        Self {
            ready_know_threshold: round3(know).max(config.know_floor),
            ready_uncertainty_threshold: round3(uncertainty).min(config.uncertainty_ceiling),
            calibration_accuracy: Some(round3(accuracy)),
            transactions_analyzed,
        }
    }

    /// Thresholds for a phase summary: adjusted when the summary is
    /// sufficient, base otherwise.
    pub fn from_summary(config: &CalibrationConfig, summary: &CalibrationSummary) -> Self {
        match summary.calibration_accuracy {
            Some(accuracy) => Self::adjusted(config, accuracy, summary.sample_count),
            None => Self::base(config, summary.sample_count),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.calibration_accuracy.is_some()
    }
}

/// Thresholds handed to the gate consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    pub noetic: PhaseThresholds,
    pub praxic: PhaseThresholds,
    pub source: ThresholdSource,
    /// Why dynamic adjustment is partly or wholly inactive.
    pub reason: Option<String>,
}

impl ThresholdSet {
    /// Full static set, used whenever computation cannot complete.
    pub fn fallback(config: &CalibrationConfig, reason: impl Into<String>) -> Self {
        Self {
            noetic: PhaseThresholds::base(config, 0),
            praxic: PhaseThresholds::base(config, 0),
            source: ThresholdSource::Static,
            reason: Some(reason.into()),
        }
    }

    /// Combine two independently computed phases.
    ///
    /// If neither phase is dynamic the whole set is reported as static with
    /// reason "insufficient data". If only one phase fell back, the set stays
    /// dynamic and the reason names the phase that fell back.
    pub fn from_phases(noetic: PhaseThresholds, praxic: PhaseThresholds) -> Self {
        let (source, reason) = match (noetic.is_dynamic(), praxic.is_dynamic()) {
            (false, false) => (ThresholdSource::Static, Some(INSUFFICIENT_DATA.to_string())),
            (true, true) => (ThresholdSource::Dynamic, None),
            (true, false) => (
                ThresholdSource::Dynamic,
                Some(format!("{INSUFFICIENT_DATA} for {} phase", WorkPhase::Praxic)),
            ),
            (false, true) => (
                ThresholdSource::Dynamic,
                Some(format!("{INSUFFICIENT_DATA} for {} phase", WorkPhase::Noetic)),
            ),
        };

        Self {
            noetic,
            praxic,
            source,
            reason,
        }
    }

    pub fn for_phase(&self, phase: WorkPhase) -> &PhaseThresholds {
        match phase {
            WorkPhase::Noetic => &self.noetic,
            WorkPhase::Praxic => &self.praxic,
        }
    }
}

/// Threshold computation could not complete.
///
/// Carries a complete static [`ThresholdSet`] so that callers never have to
/// deal with an absence of thresholds.
#[derive(Debug, Clone, Error)]
#[error("threshold computation fell back to static defaults: {diagnostic}")]
pub struct ThresholdFallback {
    pub thresholds: ThresholdSet,
    pub diagnostic: String,
}

impl ThresholdFallback {
    pub fn new(config: &CalibrationConfig, diagnostic: impl Into<String>) -> Self {
        let diagnostic = diagnostic.into();
        Self {
            thresholds: ThresholdSet::fallback(config, diagnostic.clone()),
            diagnostic,
        }
    }

    pub fn into_thresholds(self) -> ThresholdSet {
        self.thresholds
    }
}
