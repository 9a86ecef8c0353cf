//! Structured results of the attendance operations.
//!
//! Validation problems, unknown students and closed sessions are ordinary
//! negative outcomes, not errors: they travel back to the caller as a
//! [`Rejection`] with a readable reason.

use crate::model::attendance::AttendanceSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail")]
pub enum Rejection {
    /// Malformed or missing input.
    Validation(String),
    /// The student id is not in the directory.
    UnknownStudent(String),
    /// Self-mark against an event with no live window.
    SessionNotActive(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Validation(msg) => write!(f, "invalid request: {}", msg),
            Rejection::UnknownStudent(id) => write!(f, "unknown student '{}'", id),
            Rejection::SessionNotActive(event) => {
                write!(f, "session not active for event '{}'", event)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StartOutcome {
    Started { expires_at: DateTime<Utc> },
    /// A window for this event is already open; nothing was changed.
    AlreadyActive { expires_at: DateTime<Utc> },
    Rejected { reason: Rejection },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MarkOutcome {
    Accepted { summary: AttendanceSummary },
    Rejected { reason: Rejection },
}

impl MarkOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, MarkOutcome::Accepted { .. })
    }
}

/// Result of closing a window. `report` holds the CSV bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeOutcome {
    Finalized { report: Vec<u8> },
    /// Nothing was open; `report` is the last report written for the event, if any.
    AlreadyFinalized { report: Option<Vec<u8>> },
}

impl FinalizeOutcome {
    pub fn report(&self) -> Option<&[u8]> {
        match self {
            FinalizeOutcome::Finalized { report } => Some(report.as_slice()),
            FinalizeOutcome::AlreadyFinalized { report } => report.as_deref(),
        }
    }
}

/// A live window as shown on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSession {
    pub event_id: String,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Totals of the marks received while this window was open.
    pub live: AttendanceSummary,
}

/// Admin dashboard view: open windows plus how many have closed since startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionsOverview {
    pub active: Vec<ActiveSession>,
    pub finalized: u64,
}
