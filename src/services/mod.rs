//! Calibration services.
//!
//! Each service is generic over the port traits it reads from and is
//! constructed with `Arc`-shared repositories.

pub mod calibration_aggregator;
pub mod phase_boundary;
pub mod threshold_calculator;
pub mod trajectory_recorder;

pub use calibration_aggregator::CalibrationAggregator;
pub use phase_boundary::PhaseBoundaryDetector;
pub use threshold_calculator::DynamicThresholdCalculator;
pub use trajectory_recorder::{GroundedAssessment, TrajectoryRecorder};
