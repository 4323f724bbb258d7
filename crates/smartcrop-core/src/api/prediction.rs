//! Crop prediction endpoints

use serde::Deserialize;

use super::{build_http_client, check_status, ApiResult};
use crate::models::{AgronomicInput, Recommendation};

/// Source of crop recommendations
#[allow(async_fn_in_trait)]
pub trait CropPredictor {
    /// Ranked recommendations for the given inputs, in predictor order.
    async fn predict(&self, input: &AgronomicInput) -> ApiResult<Vec<Recommendation>>;

    /// Single best match for a free-text crop query. A 404 means no match.
    async fn search(&self, query: &str, input: &AgronomicInput) -> ApiResult<Recommendation>;
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    recommendations: Vec<Recommendation>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Recommendation,
}

/// HTTP client for `POST /predict` and `POST /predict/search`
#[derive(Debug, Clone)]
pub struct PredictionClient {
    base_url: String,
    client: reqwest::Client,
}

impl PredictionClient {
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: build_http_client()?,
        })
    }
}

impl CropPredictor for PredictionClient {
    async fn predict(&self, input: &AgronomicInput) -> ApiResult<Vec<Recommendation>> {
        tracing::debug!(
            season = %input.season,
            soil = %input.soil_type,
            temperature = input.temperature,
            rainfall = input.rainfall,
            "Requesting crop prediction"
        );
        let response = self
            .client
            .post(format!("{}/predict", self.base_url))
            .json(input)
            .send()
            .await?;
        let body = check_status(response).await?.text().await?;
        let payload: PredictResponse = serde_json::from_str(&body)?;
        Ok(payload.recommendations)
    }

    async fn search(&self, query: &str, input: &AgronomicInput) -> ApiResult<Recommendation> {
        tracing::debug!(query, "Searching crops");
        let response = self
            .client
            .post(format!("{}/predict/search", self.base_url))
            .query(&[("crop", query)])
            .json(input)
            .send()
            .await?;
        let body = check_status(response).await?.text().await?;
        let payload: SearchResponse = serde_json::from_str(&body)?;
        Ok(payload.result)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::models::{Season, SoilType};

    fn input() -> AgronomicInput {
        AgronomicInput::new(Season::First, SoilType::Loam, 26.0, 180.0)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn predict_posts_inputs_and_keeps_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .and(body_json(serde_json::json!({
                "season": "First",
                "soil_type": "Loam",
                "temperature": 26.0,
                "rainfall": 180.0
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "recommendations": [
                    {"crop": "Beans", "confidence": 91.0, "explanation": "Short rains suit beans."},
                    {"crop": "Maize", "confidence": 88.5}
                ]
            })))
            .mount(&server)
            .await;

        let client = PredictionClient::new(format!("{}/", server.uri())).unwrap();
        let recommendations = client.predict(&input()).await.unwrap();
        assert_eq!(
            recommendations,
            vec![
                Recommendation::new("Beans", 91.0, "Short rains suit beans."),
                Recommendation::new("Maize", 88.5, ""),
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn search_sends_query_parameter() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict/search"))
            .and(query_param("crop", "cassava"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": {
                    "crop": "Cassava",
                    "confidence": 64.0,
                    "explanation": "Drought tolerant."
                }
            })))
            .mount(&server)
            .await;

        let client = PredictionClient::new(server.uri()).unwrap();
        let result = client.search("cassava", &input()).await.unwrap();
        assert_eq!(result.crop, "Cassava");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn search_404_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict/search"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(serde_json::json!({"detail": "No match"})),
            )
            .mount(&server)
            .await;

        let client = PredictionClient::new(server.uri()).unwrap();
        let error = client.search("coffee", &input()).await.unwrap_err();
        assert!(error.is_not_found());
    }
}
