//! Password endpoints: lock and unlock.

use axum::{extract::Multipart, response::Response};

use super::form::{PDF, UploadForm, attachment, run_blocking};
use crate::error::ServiceResult;
use crate::pdf::{PdfDocument, security};

/// Encrypt the upload with `password`.
pub async fn lock_pdf_handler(multipart: Multipart) -> ServiceResult<Response> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.take_file("file")?;
    let password = form.required_text("password")?;

    let bytes = run_blocking(move || {
        let mut pdf = PdfDocument::from_bytes(&upload.data)?;
        pdf.lock(&password)?;
        pdf.into_bytes()
    })
    .await?;

    Ok(attachment(bytes, PDF, "protected.pdf"))
}

/// Remove the protection from an upload opened with `password`.
pub async fn unlock_pdf_handler(multipart: Multipart) -> ServiceResult<Response> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.take_file("file")?;
    let password = form.required_text("password")?;

    let bytes = run_blocking(move || security::unlock(&upload.data, &password)?.into_bytes()).await?;

    Ok(attachment(bytes, PDF, "unlocked.pdf"))
}
