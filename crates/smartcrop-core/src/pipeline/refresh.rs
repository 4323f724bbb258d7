//! Home screen refresh: weather, prediction, alerting, persistence.

use chrono::{DateTime, Datelike, Local};
use tokio::sync::watch;

use super::LastInputs;
use crate::api::CropPredictor;
use crate::db::PreferencesRepository;
use crate::models::{
    current_season, sample_recommendations, season_for_month, AgronomicInput, HistoryRecord,
    Recommendation, Season, SoilType, WeatherSnapshot,
};
use crate::notify::{NotificationScheduler, Notifier};
use crate::sequence::RequestSequencer;
use crate::services::HistorySink;
use crate::weather::{ForecastSource, DEFAULT_TEMPERATURE};

const WEATHER_NOT_CONFIGURED: &str = "Live weather is not configured.";
const SAMPLE_SUFFIX: &str = " Showing sample recommendations.";

/// Result of one refresh invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshOutcome {
    pub input: AgronomicInput,
    pub recommendations: Vec<Recommendation>,
    pub weather: Option<WeatherSnapshot>,
    /// Non-fatal error shown above the sample recommendations
    pub error: Option<String>,
    /// False when a newer refresh started before this one finished
    pub current: bool,
}

impl RefreshOutcome {
    pub const fn is_live(&self) -> bool {
        self.error.is_none()
    }
}

struct LiveData {
    weather: WeatherSnapshot,
    input: AgronomicInput,
    recommendations: Vec<Recommendation>,
}

/// Produces the home view from live weather and the crop predictor, falling
/// back to sample data when either is unavailable.
pub struct RefreshPipeline<P, W, H, N, S> {
    predictor: P,
    weather: Option<W>,
    history: H,
    alerts: NotificationScheduler<N, S>,
    last_inputs: LastInputs,
    sequencer: RequestSequencer,
    view: watch::Sender<Option<RefreshOutcome>>,
}

impl<P, W, H, N, S> RefreshPipeline<P, W, H, N, S>
where
    P: CropPredictor,
    W: ForecastSource,
    H: HistorySink,
    N: Notifier,
    S: PreferencesRepository,
{
    /// `weather` is `None` when no weather key is configured.
    pub fn new(
        predictor: P,
        weather: Option<W>,
        history: H,
        alerts: NotificationScheduler<N, S>,
        last_inputs: LastInputs,
    ) -> Self {
        let (view, _) = watch::channel(None);
        Self {
            predictor,
            weather,
            history,
            alerts,
            last_inputs,
            sequencer: RequestSequencer::new(),
            view,
        }
    }

    /// Latest committed home view.
    pub fn subscribe(&self) -> watch::Receiver<Option<RefreshOutcome>> {
        self.view.subscribe()
    }

    pub async fn refresh(&self, soil_type: SoilType, owner_id: Option<&str>) -> RefreshOutcome {
        self.refresh_at(soil_type, owner_id, Local::now()).await
    }

    pub async fn refresh_at(
        &self,
        soil_type: SoilType,
        owner_id: Option<&str>,
        now: DateTime<Local>,
    ) -> RefreshOutcome {
        let ticket = self.sequencer.issue();
        let season = season_for_month(now.month());

        let mut outcome = match self.fetch_live(season, soil_type).await {
            Ok(live) => {
                let current = self.sequencer.is_current(ticket);
                if current {
                    self.last_inputs.set(live.input);
                }
                self.send_alert(&live.weather, now.timestamp_millis()).await;
                self.save(owner_id, &live).await;
                RefreshOutcome {
                    input: live.input,
                    recommendations: live.recommendations,
                    weather: Some(live.weather),
                    error: None,
                    current,
                }
            }
            Err(message) => {
                tracing::warn!("Refresh fell back to sample data: {message}");
                RefreshOutcome {
                    input: AgronomicInput::fallback(season, soil_type),
                    recommendations: sample_recommendations(),
                    weather: None,
                    error: Some(format!("{message}{SAMPLE_SUFFIX}")),
                    current: false,
                }
            }
        };

        outcome.current = self.sequencer.is_current(ticket);
        if outcome.current {
            self.view.send_replace(Some(outcome.clone()));
        } else {
            tracing::debug!("Discarding stale refresh result");
        }
        outcome
    }

    /// Record live conditions for search without saving history, alerting or
    /// publishing a home view.
    ///
    /// Returns the recorded input, or why live data was unavailable.
    pub async fn prime_inputs(&self, soil_type: SoilType) -> Result<AgronomicInput, String> {
        self.prime_inputs_for(current_season(), soil_type).await
    }

    pub async fn prime_inputs_for(
        &self,
        season: Season,
        soil_type: SoilType,
    ) -> Result<AgronomicInput, String> {
        let ticket = self.sequencer.issue();
        let live = self.fetch_live(season, soil_type).await?;
        if self.sequencer.is_current(ticket) {
            self.last_inputs.set(live.input);
        }
        Ok(live.input)
    }

    async fn fetch_live(&self, season: Season, soil_type: SoilType) -> Result<LiveData, String> {
        let source = self
            .weather
            .as_ref()
            .ok_or_else(|| WEATHER_NOT_CONFIGURED.to_string())?;
        let weather = source.forecast().await.map_err(|error| error.to_string())?;

        let rainfall = if weather.rain_mm > 0.0 {
            weather.rain_mm
        } else {
            season.default_rainfall()
        };
        let temperature = if weather.temperature.is_finite() && weather.temperature != 0.0 {
            weather.temperature
        } else {
            DEFAULT_TEMPERATURE
        };
        let input = AgronomicInput::new(season, soil_type, temperature, rainfall);

        let recommendations = self
            .predictor
            .predict(&input)
            .await
            .map_err(|error| format!("Backend: {error}"))?;

        Ok(LiveData {
            weather,
            input,
            recommendations,
        })
    }

    async fn send_alert(&self, weather: &WeatherSnapshot, now: i64) {
        match self.alerts.maybe_send_weather_alert(weather, now).await {
            Ok(Some(alert)) => tracing::info!(?alert, "Weather alert sent"),
            Ok(None) => {}
            Err(error) => tracing::warn!("Weather alert failed: {error}"),
        }
    }

    async fn save(&self, owner_id: Option<&str>, live: &LiveData) {
        let Some(owner_id) = owner_id else {
            tracing::debug!("Not signed in; refresh result not saved to history");
            return;
        };
        let record = HistoryRecord::new(owner_id, &live.input, live.recommendations.clone());
        if let Err(error) = self.history.save_record(&record).await {
            tracing::warn!("Could not save refresh result to history: {error}");
        }
    }
}
