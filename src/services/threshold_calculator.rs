//! Dynamic gate threshold computation.
//!
//! Turns each phase's rolling calibration accuracy into adjusted
//! `ready_know` / `ready_uncertainty` thresholds:
//!
//! ```text
//! know        = max(know_floor,          base_know        - accuracy * autonomy_factor)
//! uncertainty = min(uncertainty_ceiling, base_uncertainty + accuracy * autonomy_factor)
//! ```
//!
//! Overconfidence (large gaps) keeps the gate near its base values; good
//! calibration loosens it, but never past the safety floors.
//!
//! Threshold computation sits on the hot path of every investigation cycle,
//! so it never fails: storage errors and timeouts resolve to the static base
//! thresholds with a diagnostic reason.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::calibration_aggregator::CalibrationAggregator;
use crate::domain::models::{
    CalibrationConfig, CalibrationSummary, PhaseThresholds, ThresholdFallback, ThresholdSet,
    WorkPhase, STORAGE_TIMEOUT,
};
use crate::domain::ports::TrajectoryRepository;

pub struct DynamicThresholdCalculator<T: TrajectoryRepository> {
    aggregator: CalibrationAggregator<T>,
    config: CalibrationConfig,
}

impl<T: TrajectoryRepository> DynamicThresholdCalculator<T> {
    pub fn new(trajectories: Arc<T>, config: CalibrationConfig) -> Self {
        Self {
            aggregator: CalibrationAggregator::new(trajectories, config.clone()),
            config,
        }
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Thresholds for the agent's next gate decision. Always returns a
    /// complete, floor-respecting set.
    pub async fn compute_thresholds(&self, ai_id: &str) -> ThresholdSet {
        self.try_compute_thresholds(ai_id)
            .await
            .unwrap_or_else(ThresholdFallback::into_thresholds)
    }

    /// Like [`compute_thresholds`](Self::compute_thresholds), but reports
    /// whether the result came from a failed computation.
    ///
    /// Insufficient history is not a failure: it yields `Ok` with static
    /// thresholds for the affected phases.
    pub async fn try_compute_thresholds(&self, ai_id: &str) -> Result<ThresholdSet, ThresholdFallback> {
        let timeout = self.config.query_timeout();

        let outcome = futures::future::try_join(
            self.phase_summary(ai_id, WorkPhase::Noetic, timeout),
            self.phase_summary(ai_id, WorkPhase::Praxic, timeout),
        )
        .await;

        let (noetic, praxic) = match outcome {
            Ok(summaries) => summaries,
            Err(fallback) => {
                warn!(
                    ai_id,
                    reason = %fallback.diagnostic,
                    "threshold computation fell back to static defaults"
                );
                return Err(fallback);
            }
        };

        let set = ThresholdSet::from_phases(
            self.phase_thresholds(&noetic),
            self.phase_thresholds(&praxic),
        );

        debug!(
            ai_id,
            source = set.source.as_str(),
            noetic_know = set.noetic.ready_know_threshold,
            noetic_uncertainty = set.noetic.ready_uncertainty_threshold,
            praxic_know = set.praxic.ready_know_threshold,
            praxic_uncertainty = set.praxic.ready_uncertainty_threshold,
            reason = ?set.reason,
            "thresholds computed"
        );

        Ok(set)
    }

    /// The one calculation shape both phases share.
    fn phase_thresholds(&self, summary: &CalibrationSummary) -> PhaseThresholds {
        PhaseThresholds::from_summary(&self.config, summary)
    }

    async fn phase_summary(
        &self,
        ai_id: &str,
        phase: WorkPhase,
        timeout: Duration,
    ) -> Result<CalibrationSummary, ThresholdFallback> {
        match tokio::time::timeout(timeout, self.aggregator.summarize(ai_id, phase)).await {
            Ok(Ok(summary)) => Ok(summary),
            Ok(Err(err)) => Err(ThresholdFallback::new(
                &self.config,
                format!("storage error: {err}"),
            )),
            Err(_) => Err(ThresholdFallback::new(&self.config, STORAGE_TIMEOUT)),
        }
    }
}
