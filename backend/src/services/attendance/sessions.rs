use crate::attendance::SessionManager;
use crate::auth::AdminToken;
use crate::error::AppError;
use crate::services::rejected;
use actix_web::{web, HttpResponse};
use common::model::outcome::{FinalizeOutcome, StartOutcome};
use common::requests::StartSessionRequest;

/// Live windows with their in-window totals, plus the count closed since startup.
pub(crate) async fn list(_admin: AdminToken, manager: web::Data<SessionManager>) -> HttpResponse {
    HttpResponse::Ok().json(manager.overview().await)
}

pub(crate) async fn start(
    _admin: AdminToken,
    request: web::Json<StartSessionRequest>,
    manager: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let outcome = manager.start_session(&request.event_id).await?;
    Ok(match &outcome {
        StartOutcome::Started { .. } => HttpResponse::Created().json(&outcome),
        StartOutcome::AlreadyActive { .. } => HttpResponse::Ok().json(&outcome),
        StartOutcome::Rejected { reason } => rejected(reason),
    })
}

/// Stops the window and returns the report. `X-Finalized: false` marks a
/// repeat call; `204` means nothing was ever finalized for the event.
pub(crate) async fn stop(
    _admin: AdminToken,
    event_id: web::Path<String>,
    manager: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let outcome = manager.stop_session(&event_id).await?;
    let finalized = matches!(outcome, FinalizeOutcome::Finalized { .. });
    Ok(match outcome.report() {
        Some(report) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(("X-Finalized", finalized.to_string()))
            .body(report.to_vec()),
        None => HttpResponse::NoContent().finish(),
    })
}
