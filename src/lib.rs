//! Epistemic Calibration - phase-aware calibration for self-assessing agents
//!
//! Agents report epistemic vectors (`know`, `uncertainty`, ...) at PREFLIGHT,
//! CHECK and POSTFLIGHT. This crate splits each session into its
//! investigation (noetic) and action (praxic) phases, records how far the
//! self-assessment drifted from grounded evidence in each phase, and turns
//! that history into dynamic gate thresholds bounded by safety floors.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models and port traits
//! - **Adapters** (`adapters`): SQLite implementations of the ports
//! - **Service Layer** (`services`): boundary detection, trajectory recording,
//!   calibration aggregation and threshold computation
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use epistemic_calibration::adapters::sqlite::{initialize_from_config, SqliteTrajectoryRepository};
//! use epistemic_calibration::{ConfigLoader, DynamicThresholdCalculator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let pool = initialize_from_config(&config.database).await?;
//!     let calculator = DynamicThresholdCalculator::new(
//!         Arc::new(SqliteTrajectoryRepository::new(pool)),
//!         config.calibration,
//!     );
//!     let thresholds = calculator.compute_thresholds("agent-7").await;
//!     println!("{}", serde_json::to_string_pretty(&thresholds)?);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    AssessmentPhase, CalibrationConfig, CalibrationSummary, CheckDecision, Config,
    EpistemicVectors, PhaseBoundary, PhaseThresholds, ThresholdFallback, ThresholdSet,
    ThresholdSource, TrajectoryPoint, TransactionEvent, WorkPhase,
};
pub use domain::ports::{TrajectoryRepository, TransactionEventRepository};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::logging::{LogConfig, LoggerImpl};
pub use services::{
    CalibrationAggregator, DynamicThresholdCalculator, GroundedAssessment, PhaseBoundaryDetector,
    TrajectoryRecorder,
};
