//! Queries against the roster and attendance tables.
//!
//! Ordering conventions: meeting days and attendance rows come back most
//! recent first, the roster alphabetically.

use chrono::NaiveDate;
use sqlx::{Executor, MySql, MySqlPool, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::model::attendance::{AttendanceRow, AttendanceStatus, MeetingDay};
use crate::model::employee::Employee;

/// Which attendance rows to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttendanceFilter {
    All,
    Date(NaiveDate),
    Employee(String),
    /// Inclusive on both ends.
    Range { start: NaiveDate, end: NaiveDate },
}

#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub id: String,
    pub status: AttendanceStatus,
    pub remarks: Option<String>,
}

// The read queries take any executor so a snapshot can run them on one
// transaction.

pub async fn list_employees<'e, E>(executor: E) -> Result<Vec<Employee>, sqlx::Error>
where
    E: Executor<'e, Database = MySql>,
{
    sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, name, email, role
        FROM team_members
        ORDER BY name ASC
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn list_meeting_days<'e, E>(
    executor: E,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<MeetingDay>, sqlx::Error>
where
    E: Executor<'e, Database = MySql>,
{
    let mut qb: QueryBuilder<MySql> =
        QueryBuilder::new("SELECT id, meeting_date, notes FROM meeting_days WHERE 1 = 1");

    if let Some(start) = start {
        qb.push(" AND meeting_date >= ").push_bind(start);
    }
    if let Some(end) = end {
        qb.push(" AND meeting_date <= ").push_bind(end);
    }
    qb.push(" ORDER BY meeting_date DESC");

    qb.build_query_as::<MeetingDay>().fetch_all(executor).await
}

pub async fn list_attendance<'e, E>(
    executor: E,
    filter: &AttendanceFilter,
) -> Result<Vec<AttendanceRow>, sqlx::Error>
where
    E: Executor<'e, Database = MySql>,
{
    let mut qb: QueryBuilder<MySql> = QueryBuilder::new(
        "SELECT id, meeting_date, employee_id, status, remarks FROM meeting_attendance",
    );

    match filter {
        AttendanceFilter::All => {}
        AttendanceFilter::Date(date) => {
            qb.push(" WHERE meeting_date = ").push_bind(*date);
        }
        AttendanceFilter::Employee(employee_id) => {
            qb.push(" WHERE employee_id = ").push_bind(employee_id.clone());
        }
        AttendanceFilter::Range { start, end } => {
            qb.push(" WHERE meeting_date >= ")
                .push_bind(*start)
                .push(" AND meeting_date <= ")
                .push_bind(*end);
        }
    }
    qb.push(" ORDER BY meeting_date DESC");

    qb.build_query_as::<AttendanceRow>().fetch_all(executor).await
}

pub async fn find_meeting_day(
    pool: &MySqlPool,
    date: NaiveDate,
) -> Result<Option<MeetingDay>, sqlx::Error> {
    sqlx::query_as::<_, MeetingDay>(
        "SELECT id, meeting_date, notes FROM meeting_days WHERE meeting_date = ?",
    )
    .bind(date)
    .fetch_optional(pool)
    .await
}

/// Returns the meeting day for `date`, creating it if needed. The flag is
/// `true` when a new row was inserted.
pub async fn get_or_create_meeting_day(
    pool: &MySqlPool,
    date: NaiveDate,
    notes: Option<&str>,
) -> Result<(MeetingDay, bool), sqlx::Error> {
    let new_id = Uuid::new_v4().to_string();

    // Only a duplicate date is swallowed; any other insert error surfaces.
    sqlx::query(
        r#"
        INSERT INTO meeting_days (id, meeting_date, notes)
        VALUES (?, ?, ?)
        ON DUPLICATE KEY UPDATE id = id
        "#,
    )
    .bind(&new_id)
    .bind(date)
    .bind(notes)
    .execute(pool)
    .await?;

    let day = find_meeting_day(pool, date)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;
    let inserted = day.id == new_id;

    Ok((day, inserted))
}

/// Makes sure `date` is a meeting day and gives every roster employee
/// without a record for it an `absent` record. Returns how many were added.
pub async fn initialize_attendance(pool: &MySqlPool, date: NaiveDate) -> Result<u64, sqlx::Error> {
    get_or_create_meeting_day(pool, date, None).await?;

    let mut tx = pool.begin().await?;

    let missing: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT tm.id
        FROM team_members tm
        WHERE NOT EXISTS (
            SELECT 1 FROM meeting_attendance ma
            WHERE ma.employee_id = tm.id AND ma.meeting_date = ?
        )
        "#,
    )
    .bind(date)
    .fetch_all(&mut *tx)
    .await?;

    if missing.is_empty() {
        tx.commit().await?;
        return Ok(0);
    }

    let mut qb: QueryBuilder<MySql> = QueryBuilder::new(
        "INSERT INTO meeting_attendance (id, meeting_date, employee_id, status) ",
    );
    qb.push_values(missing.iter(), |mut row, (employee_id,)| {
        row.push_bind(Uuid::new_v4().to_string())
            .push_bind(date)
            .push_bind(employee_id.clone())
            .push_bind(AttendanceStatus::Absent.as_ref());
    });

    let inserted = qb.build().execute(&mut *tx).await?.rows_affected();
    tx.commit().await?;

    debug!(%date, inserted, "Initialized attendance");
    Ok(inserted)
}

/// `false` when no record has that id.
pub async fn update_attendance(
    pool: &MySqlPool,
    update: &StatusUpdate,
) -> Result<bool, sqlx::Error> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM meeting_attendance WHERE id = ?)",
    )
    .bind(&update.id)
    .fetch_one(pool)
    .await?;

    if !exists {
        return Ok(false);
    }

    sqlx::query("UPDATE meeting_attendance SET status = ?, remarks = ? WHERE id = ?")
        .bind(update.status.as_ref())
        .bind(&update.remarks)
        .bind(&update.id)
        .execute(pool)
        .await?;

    Ok(true)
}

/// All or nothing: an unknown id rolls the whole batch back with
/// `RowNotFound`.
pub async fn bulk_update_attendance(
    pool: &MySqlPool,
    updates: &[StatusUpdate],
) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    for update in updates {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM meeting_attendance WHERE id = ?)",
        )
        .bind(&update.id)
        .fetch_one(&mut *tx)
        .await?;

        if !exists {
            // dropping `tx` rolls back
            return Err(sqlx::Error::RowNotFound);
        }

        sqlx::query("UPDATE meeting_attendance SET status = ?, remarks = ? WHERE id = ?")
            .bind(update.status.as_ref())
            .bind(&update.remarks)
            .bind(&update.id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(updates.len() as u64)
}

/// Removes the day's attendance records and then the day itself. `false`
/// when no meeting day exists for `date`.
pub async fn delete_meeting_day(pool: &MySqlPool, date: NaiveDate) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM meeting_attendance WHERE meeting_date = ?")
        .bind(date)
        .execute(&mut *tx)
        .await?;

    let removed = sqlx::query("DELETE FROM meeting_days WHERE meeting_date = ?")
        .bind(date)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;
    Ok(removed > 0)
}
