//! Overlay endpoints: page numbers and watermark.

use axum::{extract::Multipart, response::Response};

use super::form::{PDF, UploadForm, attachment, run_blocking};
use crate::error::ServiceResult;
use crate::pdf::PdfDocument;
use crate::pdf::stamp::{self, NumberPosition};

pub async fn add_page_numbers_handler(multipart: Multipart) -> ServiceResult<Response> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.take_file("file")?;
    let position = NumberPosition::parse(&form.text_or("position", "bottom-center")?);

    let bytes = run_blocking(move || {
        let mut pdf = PdfDocument::from_bytes(&upload.data)?;
        stamp::add_page_numbers(&mut pdf, position)?;
        pdf.into_bytes()
    })
    .await?;

    Ok(attachment(bytes, PDF, "numbered.pdf"))
}

pub async fn watermark_pdf_handler(multipart: Multipart) -> ServiceResult<Response> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.take_file("file")?;
    let text = form.required_text("text")?;

    let bytes = run_blocking(move || {
        let mut pdf = PdfDocument::from_bytes(&upload.data)?;
        stamp::add_watermark(&mut pdf, &text)?;
        pdf.into_bytes()
    })
    .await?;

    Ok(attachment(bytes, PDF, "watermarked.pdf"))
}
