//! Text endpoints: extraction, redaction search and comparison.

use axum::{
    extract::Multipart,
    http::{HeaderName, HeaderValue},
    response::Response,
};
use tracing::info;

use super::form::{PDF, TEXT, Upload, UploadForm, attachment, run_blocking};
use crate::error::{ServiceError, ServiceResult};
use crate::pdf::PdfDocument;
use crate::pdf::compare::{self, ComparedFile};
use crate::pdf::text::{self, PageMatch};

pub const REDACTION_MATCHES_HEADER: &str = "x-redaction-matches";

/// Plain text of the whole document, pages joined by newlines.
pub async fn extract_text_handler(multipart: Multipart) -> ServiceResult<Response> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.take_file("file")?;

    let extracted = run_blocking(move || text::extract_text(&upload.data)).await?;

    Ok(attachment(extracted, TEXT, "text.txt"))
}

/// Locate `text_to_redact` (case-insensitive) page by page.
///
/// The document itself is returned unchanged; the pages that matched are
/// listed, comma-separated, in the `X-Redaction-Matches` header.
pub async fn redact_pdf_handler(multipart: Multipart) -> ServiceResult<Response> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.take_file("file")?;
    let term = form.required_text("text_to_redact")?;
    let matcher = text::literal_matcher(&term)?;

    let data = upload.data.clone();
    let matches = run_blocking(move || {
        let pages = text::extract_text_pages(&data)?;
        Ok(text::find_pages(&pages, &matcher))
    })
    .await?;

    info!(
        pages = matches.len(),
        occurrences = matches.iter().map(|m| m.count).sum::<usize>(),
        "Redaction search complete"
    );

    let mut response = attachment(upload.data, PDF, "redacted.pdf");
    response.headers_mut().insert(
        HeaderName::from_static(REDACTION_MATCHES_HEADER),
        match_header(&matches)?,
    );
    Ok(response)
}

/// Page-by-page text comparison of `file1` and `file2`, as a PDF report.
pub async fn compare_pdf_handler(multipart: Multipart) -> ServiceResult<Response> {
    let mut form = UploadForm::read(multipart).await?;
    let first = form.take_file("file1")?;
    let second = form.take_file("file2")?;

    let bytes = run_blocking(move || {
        let left = compared_file(first)?;
        let right = compared_file(second)?;
        let comparisons = compare::compare_pages(&left, &right);
        let mut report = compare::comparison_report(&left, &right, &comparisons)?;
        PdfDocument::to_bytes(&mut report)
    })
    .await?;

    Ok(attachment(bytes, PDF, "comparison.pdf"))
}

fn compared_file(upload: Upload) -> ServiceResult<ComparedFile> {
    let page_count = PdfDocument::from_bytes(&upload.data)?.page_count();
    let pages = text::extract_text_pages(&upload.data)?;
    Ok(ComparedFile {
        name: upload.filename.unwrap_or_default(),
        page_count,
        pages,
    })
}

fn match_header(matches: &[PageMatch]) -> ServiceResult<HeaderValue> {
    let pages: Vec<String> = matches.iter().map(|m| m.page.to_string()).collect();
    HeaderValue::from_str(&pages.join(","))
        .map_err(|e| ServiceError::internal(format!("Invalid header value: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::test_support::*;
    use axum::http::StatusCode;

    #[test]
    fn test_match_header() {
        let matches = vec![PageMatch { page: 2, count: 1 }, PageMatch { page: 5, count: 3 }];
        assert_eq!(match_header(&matches).unwrap(), "2,5");
        assert_eq!(match_header(&[]).unwrap(), "");
    }

    #[tokio::test]
    async fn test_redact_requires_term() {
        let response = post_form(
            test_app(),
            "/api/redact-pdf",
            &[
                Part::File("file", "in.pdf", pdf_bytes(1)),
                Part::Text("text_to_redact", "   "),
            ],
        )
        .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.detail(), "Search text is empty");
    }

    #[tokio::test]
    async fn test_redact_reports_matching_page() {
        let response = post_form(
            test_app(),
            "/api/redact-pdf",
            &[
                Part::File("file", "in.pdf", pdf_bytes(3)),
                Part::Text("text_to_redact", "page 2"),
            ],
        )
        .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.header(REDACTION_MATCHES_HEADER), "2");
        assert_eq!(
            response.header("content-disposition"),
            "attachment; filename=redacted.pdf"
        );
        assert_eq!(response.body.as_ref(), pdf_bytes(3).as_slice());
    }

    #[tokio::test]
    async fn test_redact_no_match() {
        let response = post_form(
            test_app(),
            "/api/redact-pdf",
            &[
                Part::File("file", "in.pdf", pdf_bytes(2)),
                Part::Text("text_to_redact", "page 9"),
            ],
        )
        .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.header(REDACTION_MATCHES_HEADER), "");
    }

    #[tokio::test]
    async fn test_extract_text_in_page_order() {
        let response = post_form(
            test_app(),
            "/api/extract-text",
            &[Part::File("file", "in.pdf", pdf_bytes(3))],
        )
        .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.header("content-disposition"), "attachment; filename=text.txt");
        let body = String::from_utf8(response.body.to_vec()).unwrap();
        let first = body.find("Page 1").unwrap();
        let second = body.find("Page 2").unwrap();
        let third = body.find("Page 3").unwrap();
        assert!(first < second && second < third, "{body:?}");
        assert!(body[first..second].contains('\n'));
    }

    #[tokio::test]
    async fn test_text_endpoints_reject_unreadable_upload() {
        for (path, extra) in [
            ("/api/extract-text", None),
            ("/api/redact-pdf", Some(Part::Text("text_to_redact", "secret"))),
        ] {
            let mut parts = vec![Part::File("file", "notes.pdf", b"not a pdf".to_vec())];
            parts.extend(extra);
            let response = post_form(test_app(), path, &parts).await;

            assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY, "{path}");
            let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
            assert_eq!(body["code"], "unreadable_pdf");
        }
    }

    #[tokio::test]
    async fn test_compare_reports_each_shared_page() {
        let mut reversed = PdfDocument {
            doc: crate::pdf::fixtures::numbered_document(3),
        }
        .organize("2,1", crate::page_range::Strictness::Strict)
        .unwrap();
        let reversed = crate::pdf::fixtures::to_bytes(&mut reversed);

        let response = post_form(
            test_app(),
            "/api/compare-pdf",
            &[
                Part::File("file1", "a.pdf", pdf_bytes(3)),
                Part::File("file2", "b.pdf", reversed),
            ],
        )
        .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.header("content-disposition"),
            "attachment; filename=comparison.pdf"
        );
        let doc = response.document();
        let page = *doc.get_pages().get(&1).unwrap();
        let content = String::from_utf8_lossy(&doc.get_page_content(page).unwrap()).into_owned();
        assert!(content.contains("(File 1: a.pdf - 3 pages)"), "{content}");
        assert!(content.contains("(File 2: b.pdf - 2 pages)"), "{content}");
        assert!(content.contains("(Page 1: DIFFERENT)"), "{content}");
        assert!(content.contains("(Page 2: DIFFERENT)"), "{content}");
        assert!(!content.contains("Page 3:"), "{content}");
    }

    #[tokio::test]
    async fn test_compare_identical() {
        let response = post_form(
            test_app(),
            "/api/compare-pdf",
            &[
                Part::File("file1", "a.pdf", pdf_bytes(2)),
                Part::File("file2", "b.pdf", pdf_bytes(2)),
            ],
        )
        .await;

        assert_eq!(response.status, StatusCode::OK);
        let doc = response.document();
        let page = *doc.get_pages().get(&1).unwrap();
        let content = String::from_utf8_lossy(&doc.get_page_content(page).unwrap()).into_owned();
        assert!(content.contains("(Page 1: Same)"), "{content}");
        assert!(content.contains("(Page 2: Same)"), "{content}");
    }

    #[tokio::test]
    async fn test_compare_requires_both_files() {
        let response = post_form(
            test_app(),
            "/api/compare-pdf",
            &[Part::File("file1", "a.pdf", pdf_bytes(1))],
        )
        .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.detail(), "Missing required field: file2");
    }
}
