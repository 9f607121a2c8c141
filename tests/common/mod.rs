//! Common test utilities for integration tests
//!
//! Provides shared fixtures and helpers used across the integration test
//! files.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use epistemic_calibration::adapters::sqlite::{
    create_migrated_test_pool, SqliteTrajectoryRepository, SqliteTransactionEventRepository,
};
use epistemic_calibration::{EpistemicVectors, TrajectoryPoint, TrajectoryRepository, WorkPhase};

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Both repositories over one in-memory, migrated database.
pub struct TestStore {
    pub events: Arc<SqliteTransactionEventRepository>,
    pub trajectories: Arc<SqliteTrajectoryRepository>,
}

pub async fn test_store() -> TestStore {
    let pool = create_migrated_test_pool()
        .await
        .expect("Failed to create test database");
    TestStore {
        events: Arc::new(SqliteTransactionEventRepository::new(pool.clone())),
        trajectories: Arc::new(SqliteTrajectoryRepository::new(pool)),
    }
}

/// Fixed reference instant plus `secs` seconds.
pub fn at(secs: i64) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-03-15T10:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
        + Duration::seconds(secs)
}

pub fn vectors(know: f64, uncertainty: f64) -> EpistemicVectors {
    EpistemicVectors::new()
        .with("know", know)
        .with("uncertainty", uncertainty)
}

/// Append `count` grounded points for `ai_id` whose gap is `gap`.
pub async fn seed_gaps(
    repo: &SqliteTrajectoryRepository,
    ai_id: &str,
    phase: WorkPhase,
    gap: f64,
    count: i64,
) {
    for i in 0..count {
        let point = TrajectoryPoint::new(ai_id, format!("seed-{i}"), phase, "know", 0.2 + gap, Some(0.2))
            .expect("finite readings")
            .with_timestamp(at(i));
        repo.append(&point).await.expect("append trajectory point");
    }
}
