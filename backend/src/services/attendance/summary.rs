use crate::attendance::SessionManager;
use crate::error::AppError;
use actix_web::{web, HttpResponse};

pub(crate) async fn process(
    event_id: web::Path<String>,
    manager: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let summary = manager.get_summary(&event_id).await?;
    Ok(HttpResponse::Ok().json(summary))
}
