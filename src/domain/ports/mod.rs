//! Port trait definitions (Hexagonal Architecture)
//!
//! - TransactionEventRepository: the per-session self-assessment log
//! - TrajectoryRepository: self-assessed vs grounded readings
//!
//! These traits keep the calibration services independent of the storage
//! engine behind them.

pub mod transaction_event_repository;
pub mod trajectory_repository;

pub use transaction_event_repository::TransactionEventRepository;
pub use trajectory_repository::TrajectoryRepository;
