use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use common::model::outcome::Rejection;
use log::error;
use thiserror::Error;

/// Failures that abort the current request.
///
/// Expected negative outcomes (bad input, unknown student, closed session)
/// are not errors; they are [`Rejection`] values inside the outcome enums.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("PDF rendering failed: {0}")]
    Pdf(#[from] genpdf::error::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        error!("{}", self);
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": self.to_string() }))
    }
}

/// HTTP status used when a rejection is returned to a client.
pub fn rejection_status(rejection: &Rejection) -> StatusCode {
    match rejection {
        Rejection::Validation(_) => StatusCode::BAD_REQUEST,
        Rejection::UnknownStudent(_) => StatusCode::NOT_FOUND,
        Rejection::SessionNotActive(_) => StatusCode::CONFLICT,
    }
}
