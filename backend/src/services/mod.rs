//! HTTP surface. Each sub-module exposes `configure_routes()` returning the
//! actix `Scope` for its path prefix; `main` mounts them all.

pub mod admin;
pub mod attendance;
pub mod jobs;
pub mod students;

use crate::error::rejection_status;
use actix_web::HttpResponse;
use common::model::outcome::Rejection;
use serde::Serialize;

/// Error response for a rejected request, with the status code matching the reason.
pub(crate) fn rejected(reason: &Rejection) -> HttpResponse {
    HttpResponse::build(rejection_status(reason)).json(serde_json::json!({
        "error": reason.to_string(),
        "rejection": reason,
    }))
}

/// Serializes an outcome with the status code of its rejection, or 200.
pub(crate) fn outcome_response<T: Serialize>(outcome: &T, reason: Option<&Rejection>) -> HttpResponse {
    match reason {
        Some(reason) => HttpResponse::build(rejection_status(reason)).json(outcome),
        None => HttpResponse::Ok().json(outcome),
    }
}
