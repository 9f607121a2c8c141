//! Rolling calibration accuracy per agent and work phase.

use std::sync::Arc;

use crate::domain::errors::DomainResult;
use crate::domain::models::{CalibrationConfig, CalibrationSummary, WorkPhase};
use crate::domain::ports::TrajectoryRepository;

/// Averages the most recent grounded gaps for one `(ai_id, phase)`.
///
/// Noetic and praxic phases are summarised separately: investigation skill
/// and execution skill are different axes and never share a score.
pub struct CalibrationAggregator<T: TrajectoryRepository> {
    trajectories: Arc<T>,
    config: CalibrationConfig,
}

impl<T: TrajectoryRepository> CalibrationAggregator<T> {
    pub fn new(trajectories: Arc<T>, config: CalibrationConfig) -> Self {
        Self { trajectories, config }
    }

    /// Summarise with the configured lookback.
    pub async fn summarize(&self, ai_id: &str, phase: WorkPhase) -> DomainResult<CalibrationSummary> {
        self.summarize_with_lookback(ai_id, phase, self.config.lookback)
            .await
    }

    pub async fn summarize_with_lookback(
        &self,
        ai_id: &str,
        phase: WorkPhase,
        lookback: usize,
    ) -> DomainResult<CalibrationSummary> {
        let points = self
            .trajectories
            .recent_grounded(ai_id, phase, lookback)
            .await?;

        // The port already excludes ungrounded points; `filter_map` keeps the
        // mean honest against adapters that do not.
        let gaps: Vec<f64> = points.iter().filter_map(|p| p.gap).take(lookback).collect();

        let summary = CalibrationSummary::from_gaps(ai_id, phase, &gaps, self.config.min_transactions);

        tracing::debug!(
            ai_id,
            phase = phase.as_str(),
            sample_count = summary.sample_count,
            calibration_accuracy = ?summary.calibration_accuracy,
            "calibration summarised"
        );

        Ok(summary)
    }
}
