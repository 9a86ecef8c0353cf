//! Attendance endpoints.
//!
//! Session lifecycle (admin):
//! - `GET /api/attendance/sessions`: live windows with their in-window
//!   totals and the number of windows closed since startup.
//! - `POST /api/attendance/sessions` with `{event_id}`: opens a window.
//!   Returns `201` when started and `200` when one was already live.
//! - `DELETE /api/attendance/sessions/{event_id}`: stops early and returns
//!   the CSV report. Repeating it returns the last report.
//!
//! Marking:
//! - `POST /api/attendance/{event_id}/self` with `{student_id, status}`:
//!   accepted only while the window is live.
//! - `POST /api/attendance/{event_id}/scan` with `{payload, status?}`: same,
//!   with the student taken from a QR payload. Status defaults to Present.
//! - `POST /api/attendance/{event_id}/manual` (admin): no window needed.
//!
//! Reading:
//! - `GET /api/attendance/{event_id}/summary`: ledger totals.
//! - `GET /api/attendance/{event_id}/records` (admin): rows sorted by name.
//! - `GET /api/attendance/{event_id}/report.csv|report.pdf` (admin).
//! - `GET /api/attendance/events` (admin): every event with marks.

mod events;
mod mark;
mod records;
mod report;
mod sessions;
mod summary;

use actix_web::web::{delete, get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/attendance";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/sessions", get().to(sessions::list))
        .route("/sessions", post().to(sessions::start))
        .route("/sessions/{event_id}", delete().to(sessions::stop))
        .route("/events", get().to(events::process))
        .route("/{event_id}/self", post().to(mark::self_mark))
        .route("/{event_id}/scan", post().to(mark::scan))
        .route("/{event_id}/manual", post().to(mark::manual))
        .route("/{event_id}/summary", get().to(summary::process))
        .route("/{event_id}/records", get().to(records::process))
        .route("/{event_id}/report.csv", get().to(report::csv))
        .route("/{event_id}/report.pdf", get().to(report::pdf))
}
