//! Bulk CSV import of the student directory.
//!
//! The upload handler hands the raw bytes to `schedule_import`, which
//! registers a job and does the parsing and the database swap on the
//! blocking pool. Progress and the final result are reported through the
//! job controller so the admin page can poll for them.

use crate::db::Database;
use crate::error::AppError;
use crate::job_controller::state::{JobUpdate, JobsState};
use crate::students::directory::{self, ImportRejection};
use crate::students::qr;
use common::jobs::JobStatus;
use common::model::student::Student;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{info, warn};
use rayon::prelude::*;
use std::collections::HashSet;
use thiserror::Error;
use tokio::sync::mpsc;

pub const COL_NAME: &str = "Name";
pub const COL_DOMAIN: &str = "Domain";
pub const COL_JOIN_DATE: &str = "Joining Date";
pub const COL_CATEGORY: &str = "Category";
pub const COL_ID: &str = "IEEE ID";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("line {line}: {field} must not be empty")]
    EmptyField { line: u64, field: &'static str },

    #[error("line {line}: duplicate student id '{id}'")]
    DuplicateId { line: u64, id: String },

    #[error("the file contains no student rows")]
    NoRows,

    #[error("malformed CSV: {0}")]
    Malformed(#[from] csv::Error),

    #[error("{}", .0.message())]
    Rejected(ImportRejection),

    #[error(transparent)]
    Storage(#[from] AppError),
}

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    name: usize,
    domain: usize,
    join_date: usize,
    category: usize,
    id: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, ImportError> {
        let find = |wanted: &'static str| {
            headers
                .iter()
                .position(|h| h.trim().trim_start_matches('\u{feff}').eq_ignore_ascii_case(wanted))
                .ok_or(ImportError::MissingColumn(wanted))
        };
        Ok(Self {
            name: find(COL_NAME)?,
            domain: find(COL_DOMAIN)?,
            join_date: find(COL_JOIN_DATE)?,
            category: find(COL_CATEGORY)?,
            id: find(COL_ID)?,
        })
    }
}

fn cell(record: &StringRecord, idx: usize) -> String {
    record.get(idx).unwrap_or_default().trim().to_string()
}

fn first_empty_required(record: &StringRecord, cols: &Columns) -> Option<&'static str> {
    if cell(record, cols.id).is_empty() {
        Some(COL_ID)
    } else if cell(record, cols.name).is_empty() {
        Some(COL_NAME)
    } else {
        None
    }
}

fn line_of(err: &ImportError) -> u64 {
    match err {
        ImportError::EmptyField { line, .. } | ImportError::DuplicateId { line, .. } => *line,
        _ => 0,
    }
}

fn earliest(a: Option<ImportError>, b: Option<ImportError>) -> Option<ImportError> {
    match (a, b) {
        (Some(a), Some(b)) if line_of(&b) < line_of(&a) => Some(b),
        (Some(a), _) => Some(a),
        (None, b) => b,
    }
}

/// Parses an uploaded CSV into directory records, generating each QR payload.
///
/// Rows are checked in parallel; the error names the earliest offending line.
pub fn parse_students(data: &[u8], public_url: &str) -> Result<Vec<Student>, ImportError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(data);
    let cols = Columns::resolve(reader.headers()?)?;

    let records: Vec<(u64, StringRecord)> = reader
        .records()
        .map(|r| r.map(|rec| (rec.position().map(|p| p.line()).unwrap_or_default(), rec)))
        .collect::<Result<_, _>>()?;
    let records: Vec<(u64, StringRecord)> = records
        .into_iter()
        .filter(|(_, rec)| rec.iter().any(|c| !c.trim().is_empty()))
        .collect();
    if records.is_empty() {
        return Err(ImportError::NoRows);
    }

    let empty = records
        .par_iter()
        .filter_map(|(line, rec)| first_empty_required(rec, &cols).map(|f| (*line, f)))
        .min_by_key(|(line, _)| *line)
        .map(|(line, field)| ImportError::EmptyField { line, field });
    let mut seen = HashSet::with_capacity(records.len());
    let duplicate = records
        .iter()
        .find(|(_, rec)| {
            let id = cell(rec, cols.id);
            !id.is_empty() && !seen.insert(id)
        })
        .map(|(line, rec)| ImportError::DuplicateId {
            line: *line,
            id: cell(rec, cols.id),
        });
    if let Some(err) = earliest(empty, duplicate) {
        return Err(err);
    }

    Ok(records
        .par_iter()
        .map(|(_, rec)| {
            let id = cell(rec, cols.id);
            Student {
                qr_payload: qr::payload_for(public_url, &id),
                name: cell(rec, cols.name),
                domain: cell(rec, cols.domain),
                join_date: cell(rec, cols.join_date),
                category: cell(rec, cols.category),
                id,
            }
        })
        .collect())
}

fn import_blocking(
    db: &Database,
    data: &[u8],
    public_url: &str,
    tx: &mpsc::Sender<JobUpdate>,
    job_id: &str,
) -> Result<usize, ImportError> {
    let students = parse_students(data, public_url)?;
    let _ = tx.blocking_send(JobUpdate {
        job_id: job_id.to_string(),
        status: JobStatus::InProgress(students.len() as u32),
    });

    let mut conn = db.connect()?;
    directory::replace_all(&mut conn, &students)?.map_err(ImportError::Rejected)
}

/// Registers an import job and runs it in the background. Returns the job id.
pub async fn schedule_import(
    jobs: &JobsState,
    db: Database,
    data: Vec<u8>,
    public_url: String,
) -> String {
    let job_id = uuid::Uuid::new_v4().to_string();
    jobs.jobs
        .write()
        .await
        .insert(job_id.clone(), JobStatus::Pending);

    let js = jobs.clone();
    let value = job_id.clone();
    tokio::spawn(async move {
        let tx = js.tx.clone();
        let job_for_blocking = value.clone();
        let handle = tokio::task::spawn_blocking(move || {
            import_blocking(&db, &data, &public_url, &tx, &job_for_blocking)
        });

        let status = match handle.await {
            Ok(Ok(count)) => {
                info!("import {} replaced the directory with {} students", value, count);
                JobStatus::Completed(format!("Imported {} students", count))
            }
            Ok(Err(e)) => {
                warn!("import {} failed: {}", value, e);
                JobStatus::Failed(e.to_string())
            }
            Err(join_err) => JobStatus::Failed(format!("join error: {}", join_err)),
        };
        js.jobs.write().await.insert(value, status);
    });

    job_id
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://localhost:8080";

    #[test]
    fn parses_rows_in_file_order() {
        let csv = "Name,Domain,Joining Date,Category,IEEE ID\n\
                   Ada Lovelace,Web,2024-09-01,Member,100\n\
                   Brian Kernighan, Systems ,2024-10-01,Volunteer,200\n";
        let students = parse_students(csv.as_bytes(), URL).unwrap();

        assert_eq!(students.len(), 2);
        assert_eq!(students[0].id, "100");
        assert_eq!(students[1].domain, "Systems");
        assert_eq!(
            qr::student_id_from_payload(&students[1].qr_payload).as_deref(),
            Some("200")
        );
    }

    #[test]
    fn header_lookup_ignores_case_and_order() {
        let csv = "ieee id,category,name,joining date,domain\n7,Member,Grace,2023-01-01,AI\n";
        let students = parse_students(csv.as_bytes(), URL).unwrap();
        assert_eq!(students[0].name, "Grace");
        assert_eq!(students[0].domain, "AI");
    }

    #[test]
    fn missing_column_is_named() {
        let csv = "Name,Domain,Category,IEEE ID\nAda,Web,Member,1\n";
        let err = parse_students(csv.as_bytes(), URL).unwrap_err();
        assert_eq!(err.to_string(), "missing required column 'Joining Date'");
    }

    #[test]
    fn earliest_empty_field_is_reported() {
        let csv = "Name,Domain,Joining Date,Category,IEEE ID\n\
                   Ada,Web,2024,Member,1\n\
                   ,Web,2024,Member,2\n\
                   Bob,Web,2024,Member,\n";
        let err = parse_students(csv.as_bytes(), URL).unwrap_err();
        assert!(matches!(err, ImportError::EmptyField { line: 3, field: COL_NAME }));
    }

    #[test]
    fn duplicate_ids_are_reported_by_file_line() {
        let csv = "Name,Domain,Joining Date,Category,IEEE ID\n\
                   Ada,Web,2024,Member,1\n\
                   Bob,Web,2024,Member,2\n\
                   Cy,Web,2024,Member,1\n";
        let err = parse_students(csv.as_bytes(), URL).unwrap_err();
        assert_eq!(err.to_string(), "line 4: duplicate student id '1'");
    }

    #[test]
    fn earlier_of_empty_field_and_duplicate_wins() {
        let csv = "Name,Domain,Joining Date,Category,IEEE ID\n\
                   Ada,Web,2024,Member,1\n\
                   Ada,Web,2024,Member,1\n\
                   ,Web,2024,Member,3\n";
        let err = parse_students(csv.as_bytes(), URL).unwrap_err();
        assert!(matches!(err, ImportError::DuplicateId { line: 3, .. }));

        let csv = "Name,Domain,Joining Date,Category,IEEE ID\n\
                   ,Web,2024,Member,1\n\
                   Ada,Web,2024,Member,1\n";
        let err = parse_students(csv.as_bytes(), URL).unwrap_err();
        assert_eq!(err.to_string(), "line 2: Name must not be empty");
    }

    #[test]
    fn blank_lines_are_skipped_but_empty_files_fail() {
        let csv = "Name,Domain,Joining Date,Category,IEEE ID\n,,,,\n";
        assert!(matches!(
            parse_students(csv.as_bytes(), URL),
            Err(ImportError::NoRows)
        ));
    }
}
