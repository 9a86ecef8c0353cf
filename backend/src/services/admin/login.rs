use crate::auth::AdminCredentials;
use actix_web::{web, HttpResponse, Responder};
use common::requests::{LoginRequest, LoginResponse};
use log::info;

pub(crate) async fn process(
    request: web::Json<LoginRequest>,
    credentials: web::Data<AdminCredentials>,
) -> impl Responder {
    match credentials.login(request.username.trim(), &request.password) {
        Some(token) => {
            info!("admin '{}' logged in", request.username.trim());
            HttpResponse::Ok().json(LoginResponse { token })
        }
        None => HttpResponse::Unauthorized().json(serde_json::json!({ "error": "invalid credentials" })),
    }
}
