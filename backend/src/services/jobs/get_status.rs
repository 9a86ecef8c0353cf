use crate::auth::AdminToken;
use crate::job_controller::state::JobsState;
use actix_web::{web, HttpResponse, Responder};

pub(crate) async fn process(
    _admin: AdminToken,
    job_id: web::Path<String>,
    state: web::Data<JobsState>,
) -> impl Responder {
    match state.status(&job_id.into_inner()).await {
        Some(status) => HttpResponse::Ok().json(status),
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "Job ID not found" })),
    }
}
