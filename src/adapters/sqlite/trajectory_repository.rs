//! SQLite implementation of the TrajectoryRepository.

use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::{Sqlite, SqlitePool};

use super::{format_datetime, parse_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{TrajectoryPoint, WorkPhase};
use crate::domain::ports::TrajectoryRepository;

#[derive(Clone)]
pub struct SqliteTrajectoryRepository {
    pool: SqlitePool,
}

impl SqliteTrajectoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrajectoryRepository for SqliteTrajectoryRepository {
    async fn append(&self, point: &TrajectoryPoint) -> DomainResult<()> {
        insert_point(point).execute(&self.pool).await?;
        Ok(())
    }

    async fn append_all(&self, points: &[TrajectoryPoint]) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;
        for point in points {
            insert_point(point).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn recent_grounded(
        &self,
        ai_id: &str,
        phase: WorkPhase,
        limit: usize,
    ) -> DomainResult<Vec<TrajectoryPoint>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<TrajectoryRow> = sqlx::query_as(
            r#"SELECT id, ai_id, session_id, phase, vector_name,
                      self_assessed, grounded, gap, domain, timestamp
               FROM trajectory_points
               WHERE ai_id = ? AND phase = ? AND gap IS NOT NULL
               ORDER BY timestamp DESC, sequence DESC
               LIMIT ?"#,
        )
        .bind(ai_id)
        .bind(phase.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn by_session(&self, session_id: &str) -> DomainResult<Vec<TrajectoryPoint>> {
        let rows: Vec<TrajectoryRow> = sqlx::query_as(
            r#"SELECT id, ai_id, session_id, phase, vector_name,
                      self_assessed, grounded, gap, domain, timestamp
               FROM trajectory_points
               WHERE session_id = ?
               ORDER BY timestamp ASC, sequence ASC"#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

fn insert_point(point: &TrajectoryPoint) -> Query<'_, Sqlite, SqliteArguments<'_>> {
    sqlx::query(
        r#"INSERT INTO trajectory_points (
            id, ai_id, session_id, phase, vector_name,
            self_assessed, grounded, gap, domain, timestamp
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(point.id.to_string())
    .bind(&point.ai_id)
    .bind(&point.session_id)
    .bind(point.phase.as_str())
    .bind(&point.vector_name)
    .bind(point.self_assessed)
    .bind(point.grounded)
    .bind(point.gap)
    .bind(&point.domain)
    .bind(format_datetime(&point.timestamp))
}

#[derive(Debug, sqlx::FromRow)]
struct TrajectoryRow {
    id: String,
    ai_id: String,
    session_id: String,
    phase: String,
    vector_name: String,
    self_assessed: f64,
    grounded: Option<f64>,
    gap: Option<f64>,
    domain: Option<String>,
    timestamp: String,
}

impl TryFrom<TrajectoryRow> for TrajectoryPoint {
    type Error = DomainError;

    fn try_from(row: TrajectoryRow) -> Result<Self, Self::Error> {
        let phase = WorkPhase::from_str(&row.phase).ok_or_else(|| {
            DomainError::SerializationError(format!("Invalid work phase: {}", row.phase))
        })?;

        Ok(TrajectoryPoint {
            id: parse_uuid(&row.id)?,
            ai_id: row.ai_id,
            session_id: row.session_id,
            phase,
            vector_name: row.vector_name,
            self_assessed: row.self_assessed,
            grounded: row.grounded,
            gap: row.gap,
            domain: row.domain,
            timestamp: parse_datetime(&row.timestamp)?,
        })
    }
}
