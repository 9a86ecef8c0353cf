use crate::attendance::SessionManager;
use crate::auth::AdminToken;
use crate::error::AppError;
use crate::services::{outcome_response, rejected};
use crate::students::qr;
use actix_web::{web, HttpResponse};
use common::model::attendance::{AttendanceStatus, MarkActor};
use common::model::outcome::{MarkOutcome, Rejection};
use common::requests::{MarkRequest, ScanRequest};

async fn respond(
    manager: &SessionManager,
    event_id: &str,
    student_id: &str,
    status: &str,
    actor: MarkActor,
) -> Result<HttpResponse, AppError> {
    let outcome = manager.mark(event_id, student_id, status, actor).await?;
    let reason = match &outcome {
        MarkOutcome::Accepted { .. } => None,
        MarkOutcome::Rejected { reason } => Some(reason),
    };
    Ok(outcome_response(&outcome, reason))
}

/// Student marking themselves during a live window.
pub(crate) async fn self_mark(
    event_id: web::Path<String>,
    request: web::Json<MarkRequest>,
    manager: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    respond(
        &manager,
        &event_id,
        &request.student_id,
        &request.status,
        MarkActor::Student,
    )
    .await
}

/// Self-mark from a scanned ID card.
pub(crate) async fn scan(
    event_id: web::Path<String>,
    request: web::Json<ScanRequest>,
    manager: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let Some(student_id) = qr::student_id_from_payload(&request.payload) else {
        return Ok(rejected(&Rejection::Validation(
            "unrecognized QR payload".into(),
        )));
    };
    let status = request
        .status
        .clone()
        .unwrap_or_else(|| AttendanceStatus::Present.to_string());
    respond(&manager, &event_id, &student_id, &status, MarkActor::Student).await
}

/// Admin override; works whether or not a window is live.
pub(crate) async fn manual(
    _admin: AdminToken,
    event_id: web::Path<String>,
    request: web::Json<MarkRequest>,
    manager: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    respond(
        &manager,
        &event_id,
        &request.student_id,
        &request.status,
        MarkActor::Admin,
    )
    .await
}
