//! Student directory endpoints.
//!
//! - `POST /api/students/import` (admin): multipart upload with a `file` field
//!   holding the roster CSV. Returns `202` with a job id; poll
//!   `/api/jobs/{job_id}` for the result. The directory is replaced only if
//!   the whole file is valid.
//! - `GET /api/students` (admin): the whole directory, ordered by name.
//! - `GET /api/students/search?name=`: case-insensitive substring match.
//! - `GET /api/students/{id}`: one student, including the QR payload.
//! - `GET /api/students/{id}/idcard.pdf`: printable ID card.

mod get;
mod id_card;
mod import;
mod list;
mod search;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/students";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/import", post().to(import::process))
        .route("/search", get().to(search::process))
        .route("", get().to(list::process))
        .route("/{id}/idcard.pdf", get().to(id_card::process))
        .route("/{id}", get().to(get::process))
}
