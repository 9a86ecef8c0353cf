mod login;

use actix_web::web::{post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/admin";

/// `POST /api/admin/login`: exchanges the admin credentials for a bearer token.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/login", post().to(login::process))
}
