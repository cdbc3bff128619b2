//! Whole-document endpoints: merge, compress, repair, metadata, info.

use axum::{Json, extract::Multipart, response::Response};
use serde::Serialize;
use tracing::info;

use super::form::{PDF, UploadForm, attachment, run_blocking};
use crate::error::{ServiceError, ServiceResult};
use crate::pdf::{PdfDocument, merge};

/// Combine the uploaded `files`, in upload order.
pub async fn merge_pdfs_handler(multipart: Multipart) -> ServiceResult<Response> {
    let mut form = UploadForm::read(multipart).await?;
    let uploads = form.take_files("files");
    if uploads.len() < 2 {
        return Err(ServiceError::invalid_request("Need 2+ files"));
    }

    let bytes = run_blocking(move || {
        let documents = uploads
            .iter()
            .map(|upload| PdfDocument::from_bytes(&upload.data))
            .collect::<ServiceResult<Vec<_>>>()?;
        let mut merged = merge::merge(documents)?;
        PdfDocument::to_bytes(&mut merged)
    })
    .await?;

    Ok(attachment(bytes, PDF, "merged.pdf"))
}

/// Compress streams; the info dictionary survives only at `quality=high`.
pub async fn compress_pdf_handler(multipart: Multipart) -> ServiceResult<Response> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.take_file("file")?;
    let quality = form.text_or("quality", "medium")?;

    let original_size = upload.data.len();
    let bytes = run_blocking(move || {
        let mut pdf = PdfDocument::from_bytes(&upload.data)?;
        if quality != "high" {
            pdf.strip_metadata();
        }
        pdf.compress();
        pdf.into_bytes()
    })
    .await?;

    info!(original_size, compressed_size = bytes.len(), "Compressed PDF");
    Ok(attachment(bytes, PDF, "compressed.pdf"))
}

/// Re-serialize whatever lopdf could recover and stamp repair metadata.
pub async fn repair_pdf_handler(multipart: Multipart) -> ServiceResult<Response> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.take_file("file")?;

    let bytes = run_blocking(move || {
        let pdf = PdfDocument::from_bytes(&upload.data)?;
        // Rebuilding the page tree drops objects no page can reach
        let pages: Vec<u32> = (1..=pdf.page_count()).collect();
        let mut repaired = PdfDocument {
            doc: pdf.project(&pages)?,
        };
        repaired.set_metadata(&[
            ("Producer", "pdfworks repair"),
            ("Title", "Repaired Document"),
        ])?;
        repaired.into_bytes()
    })
    .await?;

    Ok(attachment(bytes, PDF, "repaired.pdf"))
}

/// Set the `title` and `author` metadata (both default to empty).
pub async fn edit_metadata_handler(multipart: Multipart) -> ServiceResult<Response> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.take_file("file")?;
    let title = form.text_or("title", "")?;
    let author = form.text_or("author", "")?;

    let bytes = run_blocking(move || {
        let mut pdf = PdfDocument::from_bytes(&upload.data)?;
        pdf.set_metadata(&[("Title", &title), ("Author", &author)])?;
        pdf.into_bytes()
    })
    .await?;

    Ok(attachment(bytes, PDF, "meta.pdf"))
}

/// Page count and info-dictionary strings as JSON.
pub async fn pdf_info_handler(multipart: Multipart) -> ServiceResult<Json<PdfInfoResponse>> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.take_file("file")?;
    let filename = upload.filename.clone();

    let info = run_blocking(move || Ok(PdfDocument::from_bytes(&upload.data)?.get_info())).await?;

    Ok(Json(PdfInfoResponse {
        filename,
        page_count: info.page_count,
        title: info.title,
        author: info.author,
        creator: info.creator,
        producer: info.producer,
        creation_date: info.creation_date,
        mod_date: info.mod_date,
        subject: info.subject,
        keywords: info.keywords,
    }))
}

#[derive(Debug, Serialize)]
pub struct PdfInfoResponse {
    pub filename: Option<String>,
    pub page_count: u32,
    pub title: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub mod_date: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::pdf::{PdfDocument, fixtures};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_merge_needs_two_files() {
        let response = post_form(
            test_app(),
            "/api/merge-pdfs",
            &[Part::File("files", "a.pdf", pdf_bytes(1))],
        )
        .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.detail(), "Need 2+ files");
    }

    #[tokio::test]
    async fn test_merge() {
        let response = post_form(
            test_app(),
            "/api/merge-pdfs",
            &[
                Part::File("files", "a.pdf", pdf_bytes(2)),
                Part::File("files", "b.pdf", pdf_bytes(1)),
            ],
        )
        .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.header("content-disposition"),
            "attachment; filename=merged.pdf"
        );
        assert_eq!(
            fixtures::page_widths(&response.document()),
            vec![101.0, 102.0, 101.0]
        );
    }

    #[tokio::test]
    async fn test_edit_metadata_and_info() {
        let response = post_form(
            test_app(),
            "/api/edit-pdf-metadata",
            &[
                Part::File("file", "in.pdf", pdf_bytes(2)),
                Part::Text("title", "Minutes"),
                Part::Text("author", "Clerk"),
            ],
        )
        .await;
        assert_eq!(response.status, StatusCode::OK);

        let info = post_form(
            test_app(),
            "/api/pdf-info",
            &[Part::File("file", "meta.pdf", response.body.to_vec())],
        )
        .await;
        assert_eq!(info.status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&info.body).unwrap();
        assert_eq!(json["page_count"], 2);
        assert_eq!(json["title"], "Minutes");
        assert_eq!(json["author"], "Clerk");
        assert_eq!(json["filename"], "meta.pdf");
    }

    #[tokio::test]
    async fn test_compress_strips_metadata_unless_high() {
        let mut pdf = PdfDocument {
            doc: fixtures::numbered_document(1),
        };
        pdf.set_metadata(&[("Title", "Keep me")]).unwrap();
        let bytes = pdf.into_bytes().unwrap();

        let medium = post_form(
            test_app(),
            "/api/compress-pdf",
            &[Part::File("file", "in.pdf", bytes.clone())],
        )
        .await;
        assert_eq!(medium.status, StatusCode::OK);
        let doc = PdfDocument {
            doc: medium.document(),
        };
        assert_eq!(doc.get_info().title, None);

        let high = post_form(
            test_app(),
            "/api/compress-pdf",
            &[
                Part::File("file", "in.pdf", bytes),
                Part::Text("quality", "high"),
            ],
        )
        .await;
        let doc = PdfDocument {
            doc: high.document(),
        };
        assert_eq!(doc.get_info().title.as_deref(), Some("Keep me"));
    }

    #[tokio::test]
    async fn test_repair() {
        let response = post_form(
            test_app(),
            "/api/repair-pdf",
            &[Part::File("file", "in.pdf", pdf_bytes(3))],
        )
        .await;

        assert_eq!(response.status, StatusCode::OK);
        let doc = PdfDocument {
            doc: response.document(),
        };
        let info = doc.get_info();
        assert_eq!(info.page_count, 3);
        assert_eq!(info.title.as_deref(), Some("Repaired Document"));
    }
}
