use crate::error::AppError;
use common::model::attendance::AttendanceRow;

pub const HEADER: [&str; 3] = ["student_id", "name", "status"];

/// Serializes ledger rows as CSV, in the order given.
pub fn render_csv(rows: &[AttendanceRow]) -> Result<Vec<u8>, AppError> {
    let mut writer = ::csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for row in rows {
        writer.write_record([row.student_id.as_str(), row.name.as_str(), row.status.as_str()])?;
    }
    writer.into_inner().map_err(|e| AppError::Io(e.into_error()))
}
