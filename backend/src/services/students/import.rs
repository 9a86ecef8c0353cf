use crate::auth::AdminToken;
use crate::config::AppConfig;
use crate::db::Database;
use crate::job_controller::state::JobsState;
use crate::students::import::schedule_import;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use common::requests::JobCreated;
use futures_util::StreamExt;
use log::info;
use thiserror::Error;

#[derive(Debug, Error)]
enum UploadError {
    #[error("the file must end with .csv")]
    NotCsv,

    #[error("missing 'file' field")]
    MissingFile,

    #[error("upload exceeds {0} bytes")]
    TooLarge(usize),

    #[error("multipart error: {0}")]
    Multipart(#[from] actix_multipart::MultipartError),
}

pub(crate) async fn process(
    _admin: AdminToken,
    payload: Multipart,
    db: web::Data<Database>,
    jobs: web::Data<JobsState>,
    config: web::Data<AppConfig>,
) -> impl Responder {
    match read_csv_upload(payload, config.max_upload_bytes).await {
        Ok(data) => {
            info!("received roster upload of {} bytes", data.len());
            let job_id = schedule_import(
                &jobs,
                db.get_ref().clone(),
                data,
                config.public_url.clone(),
            )
            .await;
            HttpResponse::Accepted().json(JobCreated { job_id })
        }
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Collects the bytes of the `file` field, which must be a `.csv` upload.
async fn read_csv_upload(mut payload: Multipart, limit: usize) -> Result<Vec<u8>, UploadError> {
    while let Some(item) = payload.next().await {
        let mut field = item?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));
        if name.as_deref() != Some("file") {
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_ascii_lowercase()))
            .unwrap_or_default();
        if !filename.ends_with(".csv") {
            return Err(UploadError::NotCsv);
        }

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            if data.len() + chunk.len() > limit {
                return Err(UploadError::TooLarge(limit));
            }
            data.extend_from_slice(&chunk);
        }
        return Ok(data);
    }
    Err(UploadError::MissingFile)
}
