use crate::attendance::SessionManager;
use crate::auth::AdminToken;
use crate::error::AppError;
use actix_web::{web, HttpResponse};

/// Every event that has at least one ledger row, most recent first.
pub(crate) async fn process(
    _admin: AdminToken,
    manager: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(manager.events().await?))
}
