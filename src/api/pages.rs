//! Page-selection endpoints: organize, split, crop, rotate.

use axum::{extract::Multipart, extract::State, response::Response};
use std::sync::Arc;
use tracing::info;

use super::AppState;
use super::form::{PDF, UploadForm, attachment, run_blocking};
use crate::error::ServiceResult;
use crate::pdf::PdfDocument;

const DEFAULT_CROP_MARGIN: i64 = 50;

/// Reorder, drop, or duplicate pages. `page_order` looks like "1,3,2,4-7".
pub async fn organize_pdf_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> ServiceResult<Response> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.take_file("file")?;
    let expression = form.required_text("page_order")?;
    let strictness = form.strictness(state.config.selection.organize)?;

    let bytes = run_blocking(move || {
        let pdf = PdfDocument::from_bytes(&upload.data)?;
        let mut organized = pdf.organize(&expression, strictness)?;
        PdfDocument::to_bytes(&mut organized)
    })
    .await?;

    Ok(attachment(bytes, PDF, "organized.pdf"))
}

/// Extract the inclusive range `start_page..=end_page`.
pub async fn split_pdf_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> ServiceResult<Response> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.take_file("file")?;
    let start = form.required_int("start_page")?;
    let end = form.required_int("end_page")?;
    let strictness = form.strictness(state.config.selection.split)?;

    let bytes = run_blocking(move || {
        let pdf = PdfDocument::from_bytes(&upload.data)?;
        let mut extracted = pdf.split(start, end, strictness)?;
        PdfDocument::to_bytes(&mut extracted)
    })
    .await?;

    Ok(attachment(bytes, PDF, "extracted_pages.pdf"))
}

/// Shrink every page by `margin` points on each side.
pub async fn crop_pdf_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> ServiceResult<Response> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.take_file("file")?;
    let margin = form.int("margin")?.unwrap_or(DEFAULT_CROP_MARGIN);
    let strictness = form.strictness(state.config.selection.crop)?;

    let bytes = run_blocking(move || {
        let mut pdf = PdfDocument::from_bytes(&upload.data)?;
        pdf.crop(margin as f32, strictness)?;
        pdf.into_bytes()
    })
    .await?;

    Ok(attachment(bytes, PDF, "cropped.pdf"))
}

/// Rotate every page by 90, 180, or 270 degrees.
pub async fn rotate_pdf_handler(multipart: Multipart) -> ServiceResult<Response> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.take_file("file")?;
    let rotation = form.required_int("rotation")?;

    let bytes = run_blocking(move || {
        let mut pdf = PdfDocument::from_bytes(&upload.data)?;
        pdf.rotate(rotation)?;
        pdf.into_bytes()
    })
    .await?;

    info!(rotation, "Rotate request served");
    Ok(attachment(bytes, PDF, "rotated.pdf"))
}
