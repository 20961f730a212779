// src/api/parser.rs
//! Response parsing and error mapping.
//!
//! Success bodies deserialize into the domain model directly; error bodies
//! are mapped into the typed [`NotionErrorCode`] vocabulary so callers can
//! distinguish recoverable filter rejections from fatal failures.

use super::client::ApiResponse;
use super::types::NotionApiErrorResponse;
use crate::error::{AppError, NotionErrorCode};
use reqwest::StatusCode;

/// Maximum characters shown when previewing unparseable response bodies.
const ERROR_BODY_PREVIEW_LENGTH: usize = 500;

/// Parse any Notion API response into the requested domain type.
pub fn parse_api_response<T>(result: ApiResponse<String>) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    if result.status.is_success() {
        parse_success_body(&result.data, &result.url)
    } else {
        Err(parse_error_body(&result.data, result.status, &result.url))
    }
}

fn parse_success_body<T>(body: &str, url: &str) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(body).map_err(|e| {
        log::error!("Failed to parse response from {}: {}", url, e);

        let preview: String = body.chars().take(ERROR_BODY_PREVIEW_LENGTH).collect();
        AppError::MalformedResponse(format!("{} (body: {})", e, preview))
    })
}

fn parse_error_body(body: &str, status: StatusCode, url: &str) -> AppError {
    match serde_json::from_str::<NotionApiErrorResponse>(body) {
        Ok(error) => AppError::NotionService {
            code: NotionErrorCode::from_api_response(&error.code),
            message: error.message,
            status,
        },
        // Fallback when the error body is not the documented shape
        Err(_) => AppError::NotionService {
            code: NotionErrorCode::from_http_status(status.as_u16()),
            message: format!("HTTP {} from {}", status, url),
            status,
        },
    }
}
