//! Multipart form collection and attachment responses.

use axum::{
    body::Bytes,
    extract::Multipart,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::collections::HashMap;

use crate::error::{ServiceError, ServiceResult};
use crate::page_range::Strictness;

pub const PDF: &str = "application/pdf";
pub const TEXT: &str = "text/plain; charset=utf-8";

/// One uploaded part of a multipart form
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: Option<String>,
    pub data: Bytes,
}

/// All parts of a multipart form, grouped by field name in arrival order
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, Vec<Upload>>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> ServiceResult<Self> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or("").to_string();
            let filename = field.file_name().map(str::to_string);
            let data = field.bytes().await.map_err(multipart_error)?;
            form.fields
                .entry(name)
                .or_default()
                .push(Upload { filename, data });
        }

        Ok(form)
    }

    /// Remove and return the first upload for `name`.
    pub fn take_file(&mut self, name: &str) -> ServiceResult<Upload> {
        self.fields
            .get_mut(name)
            .filter(|uploads| !uploads.is_empty())
            .map(|uploads| uploads.remove(0))
            .ok_or_else(|| missing(name))
    }

    /// Remove and return every upload for `name`.
    pub fn take_files(&mut self, name: &str) -> Vec<Upload> {
        self.fields.remove(name).unwrap_or_default()
    }

    pub fn text(&self, name: &str) -> ServiceResult<Option<String>> {
        match self.fields.get(name).and_then(|uploads| uploads.first()) {
            None => Ok(None),
            Some(upload) => String::from_utf8(upload.data.to_vec())
                .map(Some)
                .map_err(|_| {
                    ServiceError::invalid_request(format!("Field '{}' is not valid UTF-8", name))
                }),
        }
    }

    pub fn required_text(&self, name: &str) -> ServiceResult<String> {
        self.text(name)?.ok_or_else(|| missing(name))
    }

    pub fn text_or(&self, name: &str, default: &str) -> ServiceResult<String> {
        Ok(self.text(name)?.unwrap_or_else(|| default.to_string()))
    }

    pub fn int(&self, name: &str) -> ServiceResult<Option<i64>> {
        match self.text(name)? {
            None => Ok(None),
            Some(value) => value.trim().parse::<i64>().map(Some).map_err(|_| {
                ServiceError::invalid_request(format!(
                    "Field '{}' must be an integer, got '{}'",
                    name, value
                ))
            }),
        }
    }

    pub fn required_int(&self, name: &str) -> ServiceResult<i64> {
        self.int(name)?.ok_or_else(|| missing(name))
    }

    /// The optional `mode` field, falling back to the configured default.
    pub fn strictness(&self, default: Strictness) -> ServiceResult<Strictness> {
        match self.text("mode")? {
            None => Ok(default),
            Some(mode) => Strictness::from_form(&mode).ok_or_else(|| {
                ServiceError::invalid_request(format!(
                    "Field 'mode' must be 'strict' or 'lenient', got '{}'",
                    mode
                ))
            }),
        }
    }
}

fn missing(name: &str) -> ServiceError {
    ServiceError::invalid_request(format!("Missing required field: {}", name))
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ServiceError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServiceError::PayloadTooLarge {
            message: err.body_text(),
        }
    } else {
        ServiceError::invalid_request(err.body_text())
    }
}

/// Response carrying `body` as a downloadable file.
pub fn attachment(body: impl Into<Bytes>, content_type: &'static str, filename: &str) -> Response {
    let disposition = HeaderValue::from_str(&format!("attachment; filename={}", filename))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body.into(),
    )
        .into_response()
}

/// Run synchronous document work off the async executor.
pub async fn run_blocking<T, F>(work: F) -> ServiceResult<T>
where
    F: FnOnce() -> ServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ServiceError::internal(format!("Worker task failed: {}", e)))?
}
