use crate::auth::AdminToken;
use crate::db::Database;
use crate::error::AppError;
use crate::students::directory;
use actix_web::{web, HttpResponse};

pub(crate) async fn process(
    _admin: AdminToken,
    db: web::Data<Database>,
) -> Result<HttpResponse, AppError> {
    let students = db.run(|conn| directory::list_students(conn)).await?;
    Ok(HttpResponse::Ok().json(students))
}
