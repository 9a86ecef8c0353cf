//! Durable store of student records.
//!
//! The directory is only ever replaced as a whole: `replace_all` deletes
//! every row and inserts the new set inside one transaction, so readers see
//! either the old directory or the new one.

use crate::error::AppError;
use common::model::student::Student;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;

/// Why a directory replacement was refused. Nothing is written in either case.
///
/// Positions are 1-based indexes into the record slice. CSV imports catch
/// both problems earlier and report file line numbers instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportRejection {
    MissingField { record: usize, field: &'static str },
    DuplicateId { record: usize, id: String },
}

impl ImportRejection {
    pub fn message(&self) -> String {
        match self {
            ImportRejection::MissingField { record, field } => {
                format!("record {}: {} must not be empty", record, field)
            }
            ImportRejection::DuplicateId { record, id } => {
                format!("record {}: duplicate student id '{}'", record, id)
            }
        }
    }
}

/// Checks identifiers and names before anything is deleted.
pub fn validate_records(records: &[Student]) -> Result<(), ImportRejection> {
    let mut seen = HashSet::with_capacity(records.len());
    for (idx, student) in records.iter().enumerate() {
        let record = idx + 1;
        if student.id.trim().is_empty() {
            return Err(ImportRejection::MissingField { record, field: "id" });
        }
        if student.name.trim().is_empty() {
            return Err(ImportRejection::MissingField { record, field: "name" });
        }
        if !seen.insert(student.id.trim()) {
            return Err(ImportRejection::DuplicateId {
                record,
                id: student.id.trim().to_string(),
            });
        }
    }
    Ok(())
}

/// Replaces the whole directory. Returns the number of students now stored.
pub fn replace_all(
    conn: &mut Connection,
    records: &[Student],
) -> Result<Result<usize, ImportRejection>, AppError> {
    if let Err(rejection) = validate_records(records) {
        return Ok(Err(rejection));
    }

    let tx = conn.transaction()?;
    tx.execute("DELETE FROM students", [])?;
    {
        let mut insert = tx.prepare(
            "INSERT INTO students (id, name, domain, join_date, category, qr_payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for s in records {
            insert.execute(params![
                s.id.trim(),
                s.name.trim(),
                s.domain,
                s.join_date,
                s.category,
                s.qr_payload
            ])?;
        }
    }
    tx.commit()?;
    Ok(Ok(records.len()))
}

fn student_from_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get(0)?,
        name: row.get(1)?,
        domain: row.get(2)?,
        join_date: row.get(3)?,
        category: row.get(4)?,
        qr_payload: row.get(5)?,
    })
}

const SELECT_STUDENT: &str =
    "SELECT id, name, domain, join_date, category, qr_payload FROM students";

pub fn find_student(conn: &Connection, id: &str) -> Result<Option<Student>, AppError> {
    let student = conn
        .query_row(
            &format!("{} WHERE id = ?1", SELECT_STUDENT),
            params![id],
            student_from_row,
        )
        .optional()?;
    Ok(student)
}

pub fn student_exists(conn: &Connection, id: &str) -> Result<bool, AppError> {
    let found = conn
        .query_row("SELECT 1 FROM students WHERE id = ?1", params![id], |r| {
            r.get::<_, i64>(0)
        })
        .optional()?;
    Ok(found.is_some())
}

pub fn list_students(conn: &Connection) -> Result<Vec<Student>, AppError> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY name, id", SELECT_STUDENT))?;
    let students = stmt
        .query_map([], student_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(students)
}

/// Case-insensitive substring match on the name.
pub fn search_by_name(conn: &Connection, fragment: &str) -> Result<Vec<Student>, AppError> {
    let fragment = fragment.trim();
    if fragment.is_empty() {
        return Ok(Vec::new());
    }
    let escaped = fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    let mut stmt = conn.prepare(&format!(
        "{} WHERE name LIKE ?1 ESCAPE '\\' ORDER BY name, id",
        SELECT_STUDENT
    ))?;
    let students = stmt
        .query_map(params![format!("%{}%", escaped)], student_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(students)
}

#[cfg(test)]
pub(crate) mod test_support {
    use common::model::student::Student;

    pub fn student(id: &str, name: &str) -> Student {
        Student {
            id: id.to_string(),
            name: name.to_string(),
            domain: "Web".to_string(),
            join_date: "2024-09-01".to_string(),
            category: "Member".to_string(),
            qr_payload: format!("qr:{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::student;
    use super::*;
    use crate::db::test_support::temp_database;

    #[test]
    fn replace_all_discards_previous_directory() {
        let (_dir, db) = temp_database();
        let mut conn = db.connect().unwrap();

        replace_all(&mut conn, &[student("A", "Ada"), student("B", "Brian")])
            .unwrap()
            .unwrap();
        let stored = replace_all(&mut conn, &[student("C", "Chen")]).unwrap().unwrap();

        assert_eq!(stored, 1);
        let all = list_students(&conn).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "C");
        assert!(find_student(&conn, "A").unwrap().is_none());
    }

    #[test]
    fn duplicate_ids_leave_directory_untouched() {
        let (_dir, db) = temp_database();
        let mut conn = db.connect().unwrap();
        replace_all(&mut conn, &[student("A", "Ada")]).unwrap().unwrap();

        let rejected = replace_all(&mut conn, &[student("X", "Xia"), student("X", "Xavier")])
            .unwrap()
            .unwrap_err();

        assert_eq!(
            rejected,
            ImportRejection::DuplicateId {
                record: 2,
                id: "X".into()
            }
        );
        assert!(student_exists(&conn, "A").unwrap());
    }

    #[test]
    fn blank_name_is_rejected() {
        let rejection = validate_records(&[student("A", "  ")]).unwrap_err();
        assert_eq!(rejection.message(), "record 1: name must not be empty");
    }

    #[test]
    fn optional_fields_may_be_empty() {
        let (_dir, db) = temp_database();
        let mut conn = db.connect().unwrap();
        let bare = Student {
            id: "Z".into(),
            name: "Zoe".into(),
            domain: String::new(),
            join_date: String::new(),
            category: String::new(),
            qr_payload: String::new(),
        };
        replace_all(&mut conn, &[bare.clone()]).unwrap().unwrap();
        assert_eq!(find_student(&conn, "Z").unwrap(), Some(bare));
    }

    #[test]
    fn search_matches_substrings_and_escapes_wildcards() {
        let (_dir, db) = temp_database();
        let mut conn = db.connect().unwrap();
        replace_all(
            &mut conn,
            &[student("1", "Maria Lopez"), student("2", "Mario Rossi"), student("3", "Ana")],
        )
        .unwrap()
        .unwrap();

        let hits = search_by_name(&conn, "mari").unwrap();
        assert_eq!(hits.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(), ["1", "2"]);
        assert!(search_by_name(&conn, "%").unwrap().is_empty());
        assert!(search_by_name(&conn, "   ").unwrap().is_empty());
    }
}
