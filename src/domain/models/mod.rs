pub mod calibration;
pub mod config;
pub mod thresholds;
pub mod trajectory;
pub mod transaction;
pub mod vectors;

pub use calibration::CalibrationSummary;
pub use config::{CalibrationConfig, Config, DatabaseConfig, LoggingConfig};
pub use thresholds::{
    round3, PhaseThresholds, ThresholdFallback, ThresholdSet, ThresholdSource, INSUFFICIENT_DATA,
    STORAGE_TIMEOUT,
};
pub use trajectory::{TrajectoryPoint, WorkPhase};
pub use transaction::{
    AssessmentPhase, CheckDecision, EventPayload, EventRecord, PhaseBoundary, TransactionEvent,
};
pub use vectors::EpistemicVectors;
