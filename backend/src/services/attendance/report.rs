//! On-demand reports built from the current ledger state. They are not
//! written to the report archive; only finalization does that.

use crate::attendance::SessionManager;
use crate::auth::AdminToken;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::reports::csv::render_csv;
use crate::reports::pdf::render_attendance_pdf;
use crate::reports::ReportArchive;
use actix_web::{web, HttpResponse};

fn disposition(event_id: &str, extension: &str) -> (&'static str, String) {
    let stem = ReportArchive::file_name(event_id);
    let stem = stem.strip_suffix(".csv").unwrap_or(&stem);
    (
        "Content-Disposition",
        format!("attachment; filename=\"{}.{}\"", stem, extension),
    )
}

pub(crate) async fn csv(
    _admin: AdminToken,
    event_id: web::Path<String>,
    manager: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let rows = manager.get_records(&event_id).await?;
    let bytes = render_csv(&rows)?;
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(disposition(&event_id, "csv"))
        .body(bytes))
}

pub(crate) async fn pdf(
    _admin: AdminToken,
    event_id: web::Path<String>,
    manager: web::Data<SessionManager>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let rows = manager.get_records(&event_id).await?;
    let event = event_id.into_inner();
    let fonts_dir = config.fonts_dir.clone();
    let title = event.clone();
    let bytes = tokio::task::spawn_blocking(move || render_attendance_pdf(&rows, &title, &fonts_dir))
        .await??;
    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(disposition(&event, "pdf"))
        .body(bytes))
}
