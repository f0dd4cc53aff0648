use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::anyhow;
use chrono::NaiveDate;
use moka::future::Cache;
use sqlx::{Acquire, MySqlPool};
use thiserror::Error;
use tracing::{debug, info};

use crate::analytics::AnalyticsError;
use crate::db::attendance::{self, AttendanceFilter};
use crate::error::ApiError;
use crate::model::attendance::{AttendanceEntry, AttendanceRecord, AttendanceRow, MeetingDay};
use crate::model::employee::Employee;

/// Immutable view of everything the analytics need. Replaced wholesale on
/// every reload, never patched.
#[derive(Debug, Clone, Default)]
pub struct AttendanceSnapshot {
    pub records: Vec<AttendanceRecord>,
    pub meeting_days: Vec<NaiveDate>,
    pub roster: Vec<Employee>,
}

impl AttendanceSnapshot {
    /// Validates every stored row; one unknown status rejects the snapshot.
    pub fn from_parts(
        rows: Vec<AttendanceRow>,
        meeting_days: Vec<MeetingDay>,
        roster: Vec<Employee>,
    ) -> Result<Self, AnalyticsError> {
        let records = rows
            .into_iter()
            .map(|row| AttendanceEntry::try_from(row).map(|e| AttendanceRecord::from(&e)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            records,
            meeting_days: meeting_days.into_iter().map(|d| d.meeting_date).collect(),
            roster,
        })
    }

    pub fn employee_count(&self) -> u64 {
        self.roster.len() as u64
    }
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("database error while loading attendance: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Contract(#[from] AnalyticsError),
}

impl From<Arc<SnapshotError>> for ApiError {
    fn from(err: Arc<SnapshotError>) -> Self {
        match err.as_ref() {
            SnapshotError::Contract(e) => ApiError::Analytics(e.clone()),
            SnapshotError::Database(e) => ApiError::Internal(anyhow!("{e}")),
        }
    }
}

/// Reads roster, meeting days and all attendance rows inside one
/// repeatable-read transaction, so the three agree with each other.
pub async fn load_snapshot(pool: &MySqlPool) -> Result<AttendanceSnapshot, SnapshotError> {
    let mut conn = pool.acquire().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
        .execute(&mut *conn)
        .await?;
    let mut tx = conn.begin().await?;

    let rows = attendance::list_attendance(&mut *tx, &AttendanceFilter::All).await?;
    let days = attendance::list_meeting_days(&mut *tx, None, None).await?;
    let roster = attendance::list_employees(&mut *tx).await?;

    tx.commit().await?;

    debug!(
        records = rows.len(),
        meeting_days = days.len(),
        employees = roster.len(),
        "Attendance snapshot loaded"
    );

    Ok(AttendanceSnapshot::from_parts(rows, days, roster)?)
}

/// Holds the last loaded snapshot. Writers call [`SnapshotCache::invalidate`]
/// and the next reader reloads from scratch.
///
/// Entries are keyed by a generation that every invalidation bumps. A load
/// still running when a write lands is stored under the old generation,
/// which no later reader asks for.
#[derive(Clone)]
pub struct SnapshotCache {
    inner: Cache<u64, Arc<AttendanceSnapshot>>,
    generation: Arc<AtomicU64>,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder().max_capacity(2).time_to_live(ttl).build(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn get(&self, pool: &MySqlPool) -> Result<Arc<AttendanceSnapshot>, ApiError> {
        self.get_or_load(load_snapshot(pool)).await
    }

    /// Concurrent misses share a single `load`.
    pub async fn get_or_load<F>(&self, load: F) -> Result<Arc<AttendanceSnapshot>, ApiError>
    where
        F: Future<Output = Result<AttendanceSnapshot, SnapshotError>>,
    {
        let generation = self.generation.load(Ordering::Acquire);

        let snapshot = self
            .inner
            .try_get_with(generation, async { load.await.map(Arc::new) })
            .await
            .map_err(ApiError::from)?;

        if self.generation.load(Ordering::Acquire) != generation {
            // Invalidated mid-load: drop the stale entry instead of keeping it around.
            self.inner.invalidate(&generation).await;
        }

        Ok(snapshot)
    }

    pub fn invalidate(&self) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.inner.invalidate_all();
        debug!(generation, "Attendance snapshot invalidated");
    }
}

/// Loads the first snapshot so the first analytics request is served warm.
pub async fn warmup_snapshot_cache(cache: &SnapshotCache, pool: &MySqlPool) -> anyhow::Result<()> {
    let snapshot = cache.get(pool).await.map_err(|e| anyhow!("{e}"))?;

    info!(
        records = snapshot.records.len(),
        employees = snapshot.roster.len(),
        "Attendance snapshot warmup complete"
    );

    Ok(())
}
