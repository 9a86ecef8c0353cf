use crate::attendance::SessionManager;
use crate::auth::AdminToken;
use crate::error::AppError;
use actix_web::{web, HttpResponse};

pub(crate) async fn process(
    _admin: AdminToken,
    event_id: web::Path<String>,
    manager: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let records = manager.get_records(&event_id).await?;
    Ok(HttpResponse::Ok().json(records))
}
