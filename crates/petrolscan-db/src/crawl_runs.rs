//! Crawl run bookkeeping.
//!
//! A station worker opens a run before reading its dataset and closes it with
//! the ingest counters once the dataset is done, cancelled or broken. Only a
//! `running` run can be closed, and only once.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const RUN_COLUMNS: &str = "id, public_id, station, dataset_path, status, started_at, \
     finished_at, inserted, updated, skipped, failed, dropped, error_message";

/// Ingest counters of one run, stored as `INTEGER` columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct CrawlCounts {
    pub inserted: i32,
    pub updated: i32,
    pub skipped: i32,
    pub failed: i32,
    pub dropped: i32,
}

impl CrawlCounts {
    #[must_use]
    pub fn written(&self) -> i32 {
        self.inserted.saturating_add(self.updated)
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlOutcome {
    Succeeded,
    /// Stopped by ctrl-c or SIGTERM before the dataset was exhausted.
    Cancelled,
    Failed(String),
}

impl CrawlOutcome {
    /// Value of the `status` column.
    #[must_use]
    pub fn status(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Cancelled => "cancelled",
            Self::Failed(_) => "failed",
        }
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            Self::Succeeded | Self::Cancelled => None,
        }
    }
}

/// A row from the `crawl_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CrawlRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub station: String,
    pub dataset_path: String,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    #[sqlx(flatten)]
    pub counts: CrawlCounts,
    pub error_message: Option<String>,
}

impl CrawlRunRow {
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == "running"
    }
}

/// Opens a `running` run for `station` reading `dataset_path`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn begin_crawl_run(
    pool: &PgPool,
    station: &str,
    dataset_path: &str,
) -> Result<CrawlRunRow, DbError> {
    let row = sqlx::query_as::<_, CrawlRunRow>(&format!(
        "INSERT INTO crawl_runs (public_id, station, dataset_path) \
         VALUES ($1, $2, $3) \
         RETURNING {RUN_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(station)
    .bind(dataset_path)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Closes a running run with its outcome and counters.
///
/// # Errors
///
/// Returns [`DbError::InvalidCrawlRunTransition`] if the run does not exist
/// or was already closed, or [`DbError::Sqlx`] if the update fails.
pub async fn finish_crawl_run(
    pool: &PgPool,
    id: i64,
    outcome: &CrawlOutcome,
    counts: CrawlCounts,
) -> Result<CrawlRunRow, DbError> {
    sqlx::query_as::<_, CrawlRunRow>(&format!(
        "UPDATE crawl_runs \
         SET status = $2, finished_at = NOW(), error_message = $3, \
             inserted = $4, updated = $5, skipped = $6, failed = $7, dropped = $8 \
         WHERE id = $1 AND status = 'running' \
         RETURNING {RUN_COLUMNS}"
    ))
    .bind(id)
    .bind(outcome.status())
    .bind(outcome.error_message())
    .bind(counts.inserted)
    .bind(counts.updated)
    .bind(counts.skipped)
    .bind(counts.failed)
    .bind(counts.dropped)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::InvalidCrawlRunTransition {
        id,
        expected_status: "running",
    })
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no run has the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_crawl_run(pool: &PgPool, id: i64) -> Result<CrawlRunRow, DbError> {
    sqlx::query_as::<_, CrawlRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM crawl_runs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Most recent runs first, optionally for one station only.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_crawl_runs(
    pool: &PgPool,
    station: Option<&str>,
    limit: i64,
) -> Result<Vec<CrawlRunRow>, DbError> {
    let rows = sqlx::query_as::<_, CrawlRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM crawl_runs \
         WHERE ($1::TEXT IS NULL OR station = $1) \
         ORDER BY started_at DESC, id DESC \
         LIMIT $2"
    ))
    .bind(station)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
