use serde::{Deserialize, Serialize};

/// Body of `POST /api/admin/login`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Body of `POST /api/attendance/sessions`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StartSessionRequest {
    pub event_id: String,
}

/// Body of the self-mark and manual-mark routes.
///
/// `status` stays a raw string so an unknown value surfaces as a validation
/// rejection instead of a deserialization failure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarkRequest {
    pub student_id: String,
    pub status: String,
}

/// Body of `POST /api/attendance/{event_id}/scan`: the content of a scanned QR code.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanRequest {
    pub payload: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchQuery {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JobCreated {
    pub job_id: String,
}
