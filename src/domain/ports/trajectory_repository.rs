//! Trajectory repository port for calibration history persistence.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{TrajectoryPoint, WorkPhase};

/// Repository interface for trajectory points.
///
/// The store is append-only and shared by concurrent agent sessions.
/// Abstracts the underlying storage backend (SQLite, Postgres, in-memory, etc.).
#[async_trait]
pub trait TrajectoryRepository: Send + Sync {
    /// Append a point.
    async fn append(&self, point: &TrajectoryPoint) -> DomainResult<()>;

    /// Append a batch of points as one unit: either every point is stored
    /// or none is.
    ///
    /// The default appends one at a time and is only atomic for stores
    /// whose `append` cannot fail part-way; transactional backends
    /// should override it.
    async fn append_all(&self, points: &[TrajectoryPoint]) -> DomainResult<()> {
        for point in points {
            self.append(point).await?;
        }
        Ok(())
    }

    /// The most recent `limit` points for `(ai_id, phase)` that carry a gap,
    /// newest first. Points without grounded evidence are excluded.
    async fn recent_grounded(
        &self,
        ai_id: &str,
        phase: WorkPhase,
        limit: usize,
    ) -> DomainResult<Vec<TrajectoryPoint>>;

    /// Every point recorded for a session, including ungrounded ones,
    /// oldest first.
    async fn by_session(&self, session_id: &str) -> DomainResult<Vec<TrajectoryPoint>>;
}
