use axum::{extract::Multipart, response::Response};

use super::form::{TEXT, UploadForm, attachment, run_blocking};
use crate::error::ServiceResult;
use crate::hash::integrity_report;

/// MD5 and SHA-256 digests of any uploaded file
pub async fn file_hash_handler(multipart: Multipart) -> ServiceResult<Response> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.take_file("file")?;

    let filename = upload.filename.unwrap_or_else(|| "upload".to_string());
    let report = run_blocking(move || Ok(integrity_report(&filename, &upload.data))).await?;

    Ok(attachment(report, TEXT, "hash_report.txt"))
}
