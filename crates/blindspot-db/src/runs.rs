//! Database operations for `analysis_runs`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `analysis_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnalysisRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub trigger_source: String,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// The schema defines this as `INTEGER NOT NULL DEFAULT 0`.
    pub clusters_saved: i32,
    /// The schema defines this as `INTEGER NOT NULL DEFAULT 0`.
    pub articles_analyzed: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// analysis_runs operations
// ---------------------------------------------------------------------------

/// Creates a new analysis run in `queued` status.
///
/// Generates a UUID in Rust and binds it to `public_id`. Returns the full
/// newly-created row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert or fetch fails.
pub async fn create_analysis_run(
    pool: &PgPool,
    trigger_source: &str,
) -> Result<AnalysisRunRow, DbError> {
    let public_id = Uuid::new_v4();

    let row = sqlx::query_as::<_, AnalysisRunRow>(
        "INSERT INTO analysis_runs (public_id, trigger_source, status) \
         VALUES ($1, $2, 'queued') \
         RETURNING id, public_id, trigger_source, status, started_at, completed_at, \
                   clusters_saved, articles_analyzed, error_message, created_at",
    )
    .bind(public_id)
    .bind(trigger_source)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a run as `running` and sets `started_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not in `queued`
/// status, or [`DbError::Sqlx`] if the update fails.
pub async fn start_analysis_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE analysis_runs \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'queued'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "queued",
        });
    }

    Ok(())
}

/// Marks a run as `succeeded`, sets `completed_at = NOW()` and the result
/// counters.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not in `running`
/// status, or [`DbError::Sqlx`] if the update fails.
pub async fn complete_analysis_run(
    pool: &PgPool,
    id: i64,
    clusters_saved: i32,
    articles_analyzed: i32,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE analysis_runs \
         SET status = 'succeeded', completed_at = NOW(), \
             clusters_saved = $1, articles_analyzed = $2 \
         WHERE id = $3 AND status = 'running'",
    )
    .bind(clusters_saved)
    .bind(articles_analyzed)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a run as `failed`, sets `completed_at = NOW()` and `error_message`.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not in `running`
/// status, or [`DbError::Sqlx`] if the update fails.
pub async fn fail_analysis_run(
    pool: &PgPool,
    id: i64,
    error_message: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE analysis_runs \
         SET status = 'failed', completed_at = NOW(), error_message = $1 \
         WHERE id = $2 AND status = 'running'",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Fetches a single run by its internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_analysis_run(pool: &PgPool, id: i64) -> Result<AnalysisRunRow, DbError> {
    let row = sqlx::query_as::<_, AnalysisRunRow>(
        "SELECT id, public_id, trigger_source, status, started_at, completed_at, \
                clusters_saved, articles_analyzed, error_message, created_at \
         FROM analysis_runs \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Returns the most recent `limit` runs, ordered by `created_at DESC`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_analysis_runs(pool: &PgPool, limit: i64) -> Result<Vec<AnalysisRunRow>, DbError> {
    let rows = sqlx::query_as::<_, AnalysisRunRow>(
        "SELECT id, public_id, trigger_source, status, started_at, completed_at, \
                clusters_saved, articles_analyzed, error_message, created_at \
         FROM analysis_runs \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
