//! Rolling calibration summaries.

use serde::{Deserialize, Serialize};

use super::trajectory::WorkPhase;

/// Mean divergence between self-assessed and grounded readings for one
/// `(ai_id, phase)` over the most recent window of points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSummary {
    pub ai_id: String,
    pub phase: WorkPhase,
    /// Number of grounded points the summary was computed from.
    pub sample_count: usize,
    /// `None` when there is insufficient data.
    pub mean_divergence: Option<f64>,
    /// `clamp(1 - mean_divergence, 0, 1)`; `None` when there is insufficient data.
    pub calibration_accuracy: Option<f64>,
}

impl CalibrationSummary {
    /// Summarise a window of gaps. Fewer than `min_transactions` gaps yields
    /// an insufficient summary.
    pub fn from_gaps(
        ai_id: impl Into<String>,
        phase: WorkPhase,
        gaps: &[f64],
        min_transactions: usize,
    ) -> Self {
        let sample_count = gaps.len();
        let mut summary = Self::insufficient(ai_id, phase, sample_count);

        if sample_count == 0 || sample_count < min_transactions {
            return summary;
        }

        let mean = gaps.iter().sum::<f64>() / sample_count as f64;
        summary.mean_divergence = Some(mean);
        summary.calibration_accuracy = Some((1.0 - mean).clamp(0.0, 1.0));
        summary
    }

    pub fn insufficient(ai_id: impl Into<String>, phase: WorkPhase, sample_count: usize) -> Self {
        Self {
            ai_id: ai_id.into(),
            phase,
            sample_count,
            mean_divergence: None,
            calibration_accuracy: None,
        }
    }

    pub fn is_sufficient(&self) -> bool {
        self.calibration_accuracy.is_some()
    }
}
