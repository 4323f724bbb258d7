//! AI advisor chat endpoint

use serde::Deserialize;

use super::{build_http_client, error_detail, ApiResult};

/// Suggested questions offered alongside the advisor prompt
pub const QUICK_PROMPTS: [&str; 4] = [
    "Best crops for first season in Luwero",
    "How to improve loam soil before planting",
    "Signs of nitrogen deficiency in maize",
    "How to reduce pest damage naturally",
];

const EMPTY_QUESTION: &str = "Please type a question first.";
const EMPTY_ANSWER: &str = "No response from AI advisor.";
const CONNECTION_FAILED: &str = "Sorry, I could not connect to the AI advisor right now. \
                                 Please check your internet and try again.";

#[derive(Debug, Deserialize)]
struct ChatResponse {
    answer: Option<String>,
}

/// HTTP client for `POST /chat`.
///
/// Every outcome is a displayable string; failures never escape `ask`.
#[derive(Debug, Clone)]
pub struct AdvisorClient {
    base_url: String,
    client: reqwest::Client,
}

impl AdvisorClient {
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: build_http_client()?,
        })
    }

    pub async fn ask(&self, question: &str) -> String {
        let question = question.trim();
        if question.is_empty() {
            return EMPTY_QUESTION.to_string();
        }

        let response = match self
            .client
            .post(format!("{}/chat", self.base_url))
            .json(&serde_json::json!({ "message": question }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!("Advisor request failed: {error}");
                return CONNECTION_FAILED.to_string();
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(error) => {
                tracing::warn!("Advisor response unreadable: {error}");
                return CONNECTION_FAILED.to_string();
            }
        };

        if !status.is_success() {
            return error_detail(&body).unwrap_or_else(|| {
                format!("AI advisor error ({}). Please try again.", status.as_u16())
            });
        }

        serde_json::from_str::<ChatResponse>(&body)
            .ok()
            .and_then(|payload| payload.answer)
            .map(|answer| answer.trim().to_string())
            .filter(|answer| !answer.is_empty())
            .unwrap_or_else(|| EMPTY_ANSWER.to_string())
    }
}
