//! In-process fakes for the remote clients and notification backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::{ApiError, ApiResult, CropPredictor};
use crate::models::{AgronomicInput, Recommendation, WeatherSnapshot};
use crate::notify::{Notifier, NotifyResult, WeeklyTrigger};
use crate::weather::{ForecastSource, WeatherError, WeatherResult};

fn unavailable() -> ApiError {
    ApiError::Status {
        status: 503,
        detail: "Service unavailable".to_string(),
    }
}

#[derive(Clone, Default)]
pub struct FakePredictor {
    predictions: Option<Vec<Recommendation>>,
    matches: HashMap<String, Recommendation>,
    delays: HashMap<String, Duration>,
    predicted: Arc<Mutex<Vec<AgronomicInput>>>,
    searched: Arc<Mutex<Vec<String>>>,
}

impl FakePredictor {
    /// Predictor whose `predict` succeeds with `recommendations`.
    pub fn returning(recommendations: Vec<Recommendation>) -> Self {
        Self {
            predictions: Some(recommendations),
            ..Self::default()
        }
    }

    /// Predictor that fails every request.
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn with_match(mut self, query: &str, result: Recommendation) -> Self {
        self.matches.insert(query.to_string(), result);
        self
    }

    /// Delay search responses for `query`.
    pub fn with_delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    pub fn predicted(&self) -> Vec<AgronomicInput> {
        self.predicted.lock().unwrap().clone()
    }

    pub fn searched(&self) -> Vec<String> {
        self.searched.lock().unwrap().clone()
    }
}

impl CropPredictor for FakePredictor {
    async fn predict(&self, input: &AgronomicInput) -> ApiResult<Vec<Recommendation>> {
        self.predicted.lock().unwrap().push(*input);
        self.predictions.clone().ok_or_else(unavailable)
    }

    async fn search(&self, query: &str, _input: &AgronomicInput) -> ApiResult<Recommendation> {
        self.searched.lock().unwrap().push(query.to_string());
        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(result) = self.matches.get(query) {
            return Ok(result.clone());
        }
        if query == "error" {
            return Err(unavailable());
        }
        Err(ApiError::Status {
            status: 404,
            detail: "No match".to_string(),
        })
    }
}

#[derive(Clone)]
pub struct FakeForecast {
    reply: Result<WeatherSnapshot, String>,
    delay: Option<Duration>,
}

impl FakeForecast {
    pub fn returning(temperature: f64, rain_mm: f64) -> Self {
        Self {
            reply: Ok(WeatherSnapshot {
                temperature,
                rain_mm,
                location: "Luwero".to_string(),
                condition: "Clouds".to_string(),
                description: "scattered clouds".to_string(),
                updated_at: 0,
            }),
            delay: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl ForecastSource for FakeForecast {
    async fn forecast(&self) -> WeatherResult<WeatherSnapshot> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone().map_err(WeatherError::Provider)
    }
}

#[derive(Clone, Default)]
pub struct FakeNotifier {
    granted: bool,
    immediate: Arc<Mutex<Vec<(String, String)>>>,
    weekly: Arc<Mutex<Vec<(String, String, WeeklyTrigger)>>>,
    cancelled: Arc<Mutex<Vec<String>>>,
}

impl FakeNotifier {
    pub fn new(granted: bool) -> Self {
        Self {
            granted,
            ..Self::default()
        }
    }

    pub fn immediate(&self) -> Vec<(String, String)> {
        self.immediate.lock().unwrap().clone()
    }

    pub fn weekly(&self) -> Vec<(String, String, WeeklyTrigger)> {
        self.weekly.lock().unwrap().clone()
    }

    pub fn cancelled(&self) -> Vec<String> {
        self.cancelled.lock().unwrap().clone()
    }
}

impl Notifier for FakeNotifier {
    async fn ensure_permission(&self) -> NotifyResult<bool> {
        Ok(self.granted)
    }

    async fn notify_now(&self, title: &str, body: &str) -> NotifyResult<()> {
        self.immediate
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }

    async fn schedule_weekly(
        &self,
        title: &str,
        body: &str,
        trigger: WeeklyTrigger,
    ) -> NotifyResult<String> {
        let mut weekly = self.weekly.lock().unwrap();
        weekly.push((title.to_string(), body.to_string(), trigger));
        Ok(format!("notification-{}", weekly.len()))
    }

    async fn cancel(&self, id: &str) -> NotifyResult<()> {
        self.cancelled.lock().unwrap().push(id.to_string());
        Ok(())
    }
}
