use log::info;
use rusqlite::Connection;

/// Ordered schema steps; `PRAGMA user_version` records how many have been applied.
const MIGRATIONS: &[&str] = &[
    "CREATE TABLE students (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        domain TEXT NOT NULL DEFAULT '',
        join_date TEXT NOT NULL DEFAULT '',
        category TEXT NOT NULL DEFAULT '',
        qr_payload TEXT NOT NULL DEFAULT ''
    );
    CREATE INDEX idx_students_name ON students(name);",
    // The unique pair is what makes `ON CONFLICT` upserts in the ledger work.
    "CREATE TABLE attendance (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        student_id TEXT NOT NULL,
        event_id TEXT NOT NULL,
        status TEXT NOT NULL CHECK (status IN ('Present', 'Absent')),
        marked_by TEXT,
        updated_at TEXT NOT NULL,
        UNIQUE(student_id, event_id)
    );
    CREATE INDEX idx_attendance_event ON attendance(event_id);",
];

pub const SCHEMA_VERSION: i64 = MIGRATIONS.len() as i64;

pub(super) fn run(conn: &mut Connection) -> rusqlite::Result<()> {
    conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;

    let current: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if current >= SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (idx, step) in MIGRATIONS.iter().enumerate().skip(current as usize) {
        info!("applying schema migration {}", idx + 1);
        tx.execute_batch(step)?;
    }
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()
}
