//! OpenWeatherMap 5-day / 3-hour forecast client.

use serde::Deserialize;
use thiserror::Error;

use crate::api::REQUEST_TIMEOUT;
use crate::models::WeatherSnapshot;
use crate::util::unix_millis_now;

pub const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Luwero District, Uganda
pub const FORECAST_LATITUDE: f64 = 0.8333;
pub const FORECAST_LONGITUDE: f64 = 32.5;

pub const DEFAULT_LOCATION: &str = "Luwero District";
pub const DEFAULT_TEMPERATURE: f64 = 26.0;

/// Eight 3-hour steps cover the next 24 hours.
const RAIN_WINDOW_STEPS: usize = 8;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("OpenWeatherMap: {0}")]
    Provider(String),
    #[error("OpenWeatherMap request failed.")]
    RequestFailed,
    #[error("Weather request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse forecast: {0}")]
    Json(#[from] serde_json::Error),
}

pub type WeatherResult<T> = Result<T, WeatherError>;

/// Source of the current forecast snapshot
#[allow(async_fn_in_trait)]
pub trait ForecastSource {
    async fn forecast(&self) -> WeatherResult<WeatherSnapshot>;
}

#[derive(Clone)]
pub struct OpenWeatherClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenWeatherClient {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("OpenWeatherClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl OpenWeatherClient {
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> WeatherResult<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?,
        })
    }
}

impl ForecastSource for OpenWeatherClient {
    async fn forecast(&self) -> WeatherResult<WeatherSnapshot> {
        let latitude = FORECAST_LATITUDE.to_string();
        let longitude = FORECAST_LONGITUDE.to_string();
        let response = self
            .client
            .get(format!("{}/forecast", self.base_url))
            .query(&[
                ("lat", latitude.as_str()),
                ("lon", longitude.as_str()),
                ("units", "metric"),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<ProviderError>(&body)
                .ok()
                .and_then(|error| error.message)
                .filter(|message| !message.trim().is_empty());
            return Err(message.map_or(WeatherError::RequestFailed, WeatherError::Provider));
        }

        let forecast: Forecast = serde_json::from_str(&body)?;
        Ok(forecast.into_snapshot(unix_millis_now()))
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Forecast {
    #[serde(default)]
    list: Vec<ForecastEntry>,
    city: Option<City>,
}

#[derive(Debug, Default, Deserialize)]
struct ForecastEntry {
    main: Option<MainReadings>,
    #[serde(default)]
    weather: Vec<Conditions>,
    rain: Option<Rain>,
}

#[derive(Debug, Default, Deserialize)]
struct MainReadings {
    temp: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Conditions {
    #[serde(default)]
    main: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct Rain {
    #[serde(rename = "3h")]
    three_hours: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct City {
    name: Option<String>,
}

impl Forecast {
    fn into_snapshot(self, updated_at: i64) -> WeatherSnapshot {
        let first = self.list.first();
        let temperature = first
            .and_then(|entry| entry.main.as_ref())
            .and_then(|main| main.temp)
            .filter(|temp| temp.is_finite() && *temp != 0.0)
            .unwrap_or(DEFAULT_TEMPERATURE);
        let rain_mm = self
            .list
            .iter()
            .take(RAIN_WINDOW_STEPS)
            .filter_map(|entry| entry.rain.as_ref().and_then(|rain| rain.three_hours))
            .filter(|rain| rain.is_finite())
            .sum();
        let conditions = first.and_then(|entry| entry.weather.first());

        WeatherSnapshot {
            temperature,
            rain_mm,
            location: self
                .city
                .and_then(|city| city.name)
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            condition: conditions.map(|c| c.main.clone()).unwrap_or_default(),
            description: conditions.map(|c| c.description.clone()).unwrap_or_default(),
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn entry(temp: f64, rain: Option<f64>) -> serde_json::Value {
        let mut value = serde_json::json!({
            "main": {"temp": temp},
            "weather": [{"main": "Rain", "description": "light rain"}]
        });
        if let Some(rain) = rain {
            value["rain"] = serde_json::json!({"3h": rain});
        }
        value
    }

    #[test]
    fn rain_sums_first_eight_steps() {
        let list: Vec<serde_json::Value> = (0..10).map(|_| entry(24.0, Some(2.0))).collect();
        let forecast: Forecast = serde_json::from_value(serde_json::json!({
            "list": list,
            "city": {"name": "Luwero"}
        }))
        .unwrap();

        let snapshot = forecast.into_snapshot(42);
        assert_eq!(snapshot.rain_mm, 16.0);
        assert_eq!(snapshot.temperature, 24.0);
        assert_eq!(snapshot.location, "Luwero");
        assert_eq!(snapshot.condition, "Rain");
        assert_eq!(snapshot.description, "light rain");
        assert_eq!(snapshot.updated_at, 42);
    }

    #[test]
    fn empty_forecast_uses_defaults() {
        let snapshot = Forecast::default().into_snapshot(0);
        assert_eq!(snapshot.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(snapshot.rain_mm, 0.0);
        assert_eq!(snapshot.location, DEFAULT_LOCATION);
        assert!(snapshot.condition.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn forecast_queries_fixed_point() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("lat", "0.8333"))
            .and(query_param("lon", "32.5"))
            .and(query_param("units", "metric"))
            .and(query_param("appid", "owm-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "list": [entry(31.5, Some(4.0)), entry(29.0, None)],
                "city": {"name": "Luwero"}
            })))
            .mount(&server)
            .await;

        let client = OpenWeatherClient::with_base_url(server.uri(), "owm-key").unwrap();
        let snapshot = client.forecast().await.unwrap();
        assert_eq!(snapshot.temperature, 31.5);
        assert_eq!(snapshot.rain_mm, 4.0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn provider_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(401).set_body_json(
                serde_json::json!({"cod": 401, "message": "Invalid API key."}),
            ))
            .mount(&server)
            .await;

        let client = OpenWeatherClient::with_base_url(server.uri(), "bad").unwrap();
        let error = client.forecast().await.unwrap_err();
        assert_eq!(error.to_string(), "OpenWeatherMap: Invalid API key.");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_message_uses_generic_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = OpenWeatherClient::with_base_url(server.uri(), "key").unwrap();
        let error = client.forecast().await.unwrap_err();
        assert_eq!(error.to_string(), "OpenWeatherMap request failed.");
    }
}
