//! Single shared admin account.
//!
//! Logging in with the configured username and password yields a bearer
//! token (md5 hex of `username:password`). Handlers that need an admin take
//! an [`AdminToken`] argument; extraction fails with 401 unless the request
//! carries `Authorization: Bearer <token>`.

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::http::StatusCode;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse, ResponseError};
use log::{error, warn};
use std::future::{ready, Ready};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing or invalid admin token")]
    Unauthorized,

    #[error("admin credentials are not configured")]
    NotConfigured,
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": self.to_string() }))
    }
}

#[derive(Debug, Clone)]
pub struct AdminCredentials {
    username: String,
    token: String,
}

impl AdminCredentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            token: token_for(username, password),
        }
    }

    /// Returns the bearer token when the credentials match.
    pub fn login(&self, username: &str, password: &str) -> Option<String> {
        if username == self.username && token_for(username, password) == self.token {
            Some(self.token.clone())
        } else {
            warn!("failed admin login for '{}'", username);
            None
        }
    }

    pub fn accepts(&self, token: &str) -> bool {
        token == self.token
    }
}

pub fn token_for(username: &str, password: &str) -> String {
    format!("{:x}", md5::compute(format!("{}:{}", username, password)))
}

/// Proof that the request was made by the admin.
#[derive(Debug, Clone, Copy)]
pub struct AdminToken;

fn bearer(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

impl FromRequest for AdminToken {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let Some(credentials) = req.app_data::<web::Data<AdminCredentials>>() else {
            error!("AdminCredentials missing from app data");
            return ready(Err(AuthError::NotConfigured));
        };
        match bearer(req) {
            Some(token) if credentials.accepts(token) => ready(Ok(AdminToken)),
            _ => ready(Err(AuthError::Unauthorized)),
        }
    }
}
