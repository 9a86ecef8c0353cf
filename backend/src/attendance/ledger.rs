//! Durable attendance outcomes, one per (student, event) pair.
//!
//! Writes go through `upsert`, which checks the student against the
//! directory and then relies on `UNIQUE(student_id, event_id)` so a repeat
//! mark overwrites instead of adding a row. The check and the write share an
//! IMMEDIATE transaction, so concurrent writers for the same pair serialize
//! and the last one wins.

use crate::error::AppError;
use crate::students::directory;
use common::model::attendance::{
    AttendanceRow, AttendanceStatus, AttendanceSummary, EventOverview, MarkActor,
};
use rusqlite::{params, Connection, Row, TransactionBehavior};

/// The write was refused because the student is not in the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStudent(pub String);

pub fn upsert(
    conn: &mut Connection,
    student_id: &str,
    event_id: &str,
    status: AttendanceStatus,
    actor: Option<MarkActor>,
) -> Result<Result<(), UnknownStudent>, AppError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    if !directory::student_exists(&tx, student_id)? {
        return Ok(Err(UnknownStudent(student_id.to_string())));
    }
    tx.execute(
        "INSERT INTO attendance (student_id, event_id, status, marked_by, updated_at)
         VALUES (?1, ?2, ?3, ?4, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
         ON CONFLICT(student_id, event_id) DO UPDATE SET
             status = excluded.status,
             marked_by = excluded.marked_by,
             updated_at = excluded.updated_at",
        params![
            student_id,
            event_id,
            status.as_str(),
            actor.map(MarkActor::as_str)
        ],
    )?;
    tx.commit()?;
    Ok(Ok(()))
}

fn parse_status(raw: String) -> rusqlite::Result<AttendanceStatus> {
    raw.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn row_from_sql(row: &Row<'_>) -> rusqlite::Result<AttendanceRow> {
    Ok(AttendanceRow {
        student_id: row.get(0)?,
        name: row.get(1)?,
        status: parse_status(row.get(2)?)?,
    })
}

/// Records for one event joined with student names. Order is unspecified.
///
/// A record whose student disappeared in a later import keeps an empty name
/// so it still lines up with `aggregate`.
pub fn query(conn: &Connection, event_id: &str) -> Result<Vec<AttendanceRow>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT a.student_id, COALESCE(s.name, ''), a.status
         FROM attendance a
         LEFT JOIN students s ON s.id = a.student_id
         WHERE a.event_id = ?1",
    )?;
    let rows = stmt
        .query_map(params![event_id], row_from_sql)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// `query`, sorted by student name then id, as used by reports.
pub fn query_sorted(conn: &Connection, event_id: &str) -> Result<Vec<AttendanceRow>, AppError> {
    let mut rows = query(conn, event_id)?;
    rows.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.student_id.cmp(&b.student_id))
    });
    Ok(rows)
}

pub fn aggregate(conn: &Connection, event_id: &str) -> Result<AttendanceSummary, AppError> {
    let summary = conn.query_row(
        "SELECT COUNT(*),
                COALESCE(SUM(status = 'Present'), 0),
                COALESCE(SUM(status = 'Absent'), 0)
         FROM attendance WHERE event_id = ?1",
        params![event_id],
        |row| {
            Ok(AttendanceSummary {
                total: row.get(0)?,
                present: row.get(1)?,
                absent: row.get(2)?,
            })
        },
    )?;
    Ok(summary)
}

/// Every event with at least one record, most recently marked first.
pub fn events(conn: &Connection) -> Result<Vec<EventOverview>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT event_id,
                COUNT(*),
                SUM(status = 'Present'),
                SUM(status = 'Absent'),
                MAX(updated_at)
         FROM attendance
         GROUP BY event_id
         ORDER BY MAX(updated_at) DESC, event_id",
    )?;
    let events = stmt
        .query_map([], |row| {
            Ok(EventOverview {
                event_id: row.get(0)?,
                summary: AttendanceSummary {
                    total: row.get(1)?,
                    present: row.get(2)?,
                    absent: row.get(3)?,
                },
                last_marked_at: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(events)
}
