use crate::db::Database;
use crate::error::AppError;
use crate::services::rejected;
use crate::students::directory;
use actix_web::{web, HttpResponse};
use common::model::outcome::Rejection;
use common::requests::SearchQuery;

pub(crate) async fn process(
    query: web::Query<SearchQuery>,
    db: web::Data<Database>,
) -> Result<HttpResponse, AppError> {
    let fragment = query.into_inner().name.trim().to_string();
    if fragment.is_empty() {
        return Ok(rejected(&Rejection::Validation("name must not be empty".into())));
    }
    let students = db
        .run(move |conn| directory::search_by_name(conn, &fragment))
        .await?;
    Ok(HttpResponse::Ok().json(students))
}
