use crate::db::Database;
use crate::error::AppError;
use crate::services::rejected;
use crate::students::directory;
use actix_web::{web, HttpResponse};
use common::model::outcome::Rejection;

pub(crate) async fn process(
    id: web::Path<String>,
    db: web::Data<Database>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let lookup = id.clone();
    match db.run(move |conn| directory::find_student(conn, &lookup)).await? {
        Some(student) => Ok(HttpResponse::Ok().json(student)),
        None => Ok(rejected(&Rejection::UnknownStudent(id))),
    }
}
