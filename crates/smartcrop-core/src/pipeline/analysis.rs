//! Manual analysis with an explicit save-to-history step.

use thiserror::Error;

use super::LastInputs;
use crate::api::CropPredictor;
use crate::models::{
    offline_recommendations, AgronomicInput, HistoryRecord, Recommendation, Season, SoilType,
};
use crate::services::HistorySink;
use crate::{Error, Result};

const OFFLINE_MESSAGE: &str = "Could not reach the backend. Showing offline recommendations.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("Please enter valid temperature and rainfall values.")]
    InvalidMeasurements,
}

/// Recommendations for a manual analysis, ready to be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub input: AgronomicInput,
    pub recommendations: Vec<Recommendation>,
    /// Set when offline recommendations were substituted
    pub error: Option<String>,
}

pub struct AnalysisPipeline<P, H> {
    predictor: P,
    history: H,
    last_inputs: LastInputs,
}

impl<P: CropPredictor, H: HistorySink> AnalysisPipeline<P, H> {
    pub const fn new(predictor: P, history: H, last_inputs: LastInputs) -> Self {
        Self {
            predictor,
            history,
            last_inputs,
        }
    }

    /// Validate the entered measurements and request recommendations.
    ///
    /// Measurements must parse to finite, non-zero numbers; otherwise no
    /// request is made.
    pub async fn analyze(
        &self,
        season: Season,
        soil_type: SoilType,
        temperature: &str,
        rainfall: &str,
    ) -> std::result::Result<AnalysisResult, AnalysisError> {
        let input = AgronomicInput::new(
            season,
            soil_type,
            parse_measure(temperature)?,
            parse_measure(rainfall)?,
        );
        if !input.is_valid() {
            return Err(AnalysisError::InvalidMeasurements);
        }

        match self.predictor.predict(&input).await {
            Ok(recommendations) => {
                self.last_inputs.set(input);
                Ok(AnalysisResult {
                    input,
                    recommendations,
                    error: None,
                })
            }
            Err(error) => {
                tracing::warn!("Manual analysis fell back to offline recommendations: {error}");
                Ok(AnalysisResult {
                    input,
                    recommendations: offline_recommendations(),
                    error: Some(OFFLINE_MESSAGE.to_string()),
                })
            }
        }
    }

    /// Save an analysis for `owner_id`. Without a signed-in owner nothing is
    /// written and [`Error::AuthRequired`] is returned.
    pub async fn save(
        &self,
        owner_id: Option<&str>,
        result: &AnalysisResult,
    ) -> Result<HistoryRecord> {
        let owner_id = owner_id.ok_or(Error::AuthRequired)?;
        let record = HistoryRecord::new(owner_id, &result.input, result.recommendations.clone());
        self.history.save_record(&record).await?;
        tracing::info!(id = %record.id, "Analysis saved to history");
        Ok(record)
    }
}

fn parse_measure(raw: &str) -> std::result::Result<f64, AnalysisError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| AnalysisError::InvalidMeasurements)
}

/// Status line shown after a save attempt.
pub fn save_status_message<T>(outcome: &Result<T>) -> String {
    match outcome {
        Ok(_) => "Saved to history.".to_string(),
        Err(error) => format!("Save failed: {error}"),
    }
}
