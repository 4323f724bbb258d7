//! Clients for the SmartCrop backend (crop prediction and AI advisor).

mod advisor;
mod prediction;

use std::time::Duration;

use thiserror::Error;

pub use advisor::{AdvisorClient, QUICK_PROMPTS};
pub use prediction::{CropPredictor, PredictionClient};

/// Applied to every backend request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Backend returned HTTP {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("Failed to parse backend response: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// FastAPI-style error body
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// Extract `detail` from an error body, if it carries a readable one.
fn error_detail(body: &str) -> Option<String> {
    let detail = serde_json::from_str::<ErrorBody>(body).ok()?.detail?;
    match detail {
        serde_json::Value::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn build_http_client() -> ApiResult<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

async fn check_status(response: reqwest::Response) -> ApiResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let detail = error_detail(&body).unwrap_or_else(|| crate::util::compact_text(&body));
    Err(ApiError::Status { status, detail })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_detail_reads_string_detail() {
        assert_eq!(
            error_detail(r#"{"detail":" Model unavailable "}"#).as_deref(),
            Some("Model unavailable")
        );
        assert_eq!(error_detail(r#"{"detail":null}"#), None);
        assert_eq!(error_detail("not json"), None);
    }

    #[test]
    fn not_found_is_detected() {
        let error = ApiError::Status {
            status: 404,
            detail: String::new(),
        };
        assert!(error.is_not_found());
    }
}
