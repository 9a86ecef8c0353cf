use crate::config::AppConfig;
use crate::db::Database;
use crate::error::AppError;
use crate::reports::pdf::render_id_card;
use crate::services::rejected;
use crate::students::directory;
use actix_web::{web, HttpResponse};
use common::model::outcome::Rejection;

/// Renders the student's ID card and serves it inline.
pub(crate) async fn process(
    id: web::Path<String>,
    db: web::Data<Database>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let fonts_dir = config.fonts_dir.clone();
    let lookup = id.clone();
    let pdf = db
        .run(move |conn| match directory::find_student(conn, &lookup)? {
            Some(student) => render_id_card(&student, &fonts_dir).map(Some),
            None => Ok(None),
        })
        .await?;

    match pdf {
        Some(bytes) => Ok(HttpResponse::Ok()
            .content_type("application/pdf")
            .insert_header((
                "Content-Disposition",
                format!("inline; filename=\"idcard-{}.pdf\"", id),
            ))
            .body(bytes)),
        None => Ok(rejected(&Rejection::UnknownStudent(id))),
    }
}
