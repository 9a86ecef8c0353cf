use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Outcome recorded for one student at one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown attendance status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for AttendanceStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// Who submitted a mark. Stored in the `marked_by` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkActor {
    /// The student marking themselves; only allowed while a session is live.
    Student,
    /// An administrator; allowed for any event at any time.
    Admin,
}

impl MarkActor {
    pub fn as_str(self) -> &'static str {
        match self {
            MarkActor::Student => "self",
            MarkActor::Admin => "admin",
        }
    }
}

/// Ledger totals for one event. Students never marked are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub total: u32,
    pub present: u32,
    pub absent: u32,
}

/// One ledger row joined with the student's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRow {
    pub student_id: String,
    pub name: String,
    pub status: AttendanceStatus,
}

/// An event that has at least one ledger record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOverview {
    pub event_id: String,
    pub summary: AttendanceSummary,
    pub last_marked_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(" present ".parse(), Ok(AttendanceStatus::Present));
        assert_eq!("ABSENT".parse(), Ok(AttendanceStatus::Absent));
        assert!("late".parse::<AttendanceStatus>().is_err());
    }

    #[test]
    fn unknown_status_names_the_input() {
        let err = "late".parse::<AttendanceStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown attendance status 'late'");
        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }

    #[test]
    fn status_serializes_as_variant_name() {
        let json = serde_json::to_string(&AttendanceStatus::Absent).unwrap();
        assert_eq!(json, "\"Absent\"");
    }
}
