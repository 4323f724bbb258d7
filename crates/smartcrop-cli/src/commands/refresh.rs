use serde::Serialize;
use smartcrop_core::models::WeatherSnapshot;
use smartcrop_core::pipeline::{LastInputs, RefreshOutcome};
use smartcrop_core::{AgronomicInput, Recommendation, SoilType};

use crate::commands::common::{
    format_input_summary, format_recommendation_lines, format_weather_line, Account, AppContext,
};
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct RefreshView<'a> {
    input: &'a AgronomicInput,
    recommendations: &'a [Recommendation],
    weather: Option<&'a WeatherSnapshot>,
    error: Option<&'a str>,
}

pub async fn run_refresh(
    context: &AppContext,
    soil: Option<SoilType>,
    as_json: bool,
) -> Result<(), CliError> {
    let store = context.open_store().await?;
    let account = context.open_account(&store).await?;
    let soil = soil.unwrap_or_else(|| profile_soil(account.as_ref()));
    let owner_id = account.as_ref().and_then(Account::current_user_id);

    let pipeline = context.refresh_pipeline(&store, LastInputs::new())?;
    let outcome = pipeline.refresh(soil, owner_id).await;
    print_refresh(&outcome, as_json)
}

/// Fetch live conditions for search without touching history or alerts.
///
/// The returned slot stays empty when live data is unavailable.
pub async fn prime_search_inputs(context: &AppContext) -> Result<LastInputs, CliError> {
    let store = context.open_store().await?;
    let account = context.open_account(&store).await?;
    let soil = profile_soil(account.as_ref());

    let last_inputs = LastInputs::new();
    let pipeline = context.refresh_pipeline(&store, last_inputs.clone())?;
    if let Err(error) = pipeline.prime_inputs(soil).await {
        tracing::debug!("No live inputs for search: {error}");
    }
    Ok(last_inputs)
}

fn profile_soil(account: Option<&Account>) -> SoilType {
    account.map_or(SoilType::Loam, Account::default_soil)
}

fn print_refresh(outcome: &RefreshOutcome, as_json: bool) -> Result<(), CliError> {
    if as_json {
        let view = RefreshView {
            input: &outcome.input,
            recommendations: &outcome.recommendations,
            weather: outcome.weather.as_ref(),
            error: outcome.error.as_deref(),
        };
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    if let Some(error) = &outcome.error {
        println!("{error}");
    }
    if let Some(weather) = &outcome.weather {
        println!("{}", format_weather_line(weather));
    }
    println!("Inputs: {}", format_input_summary(&outcome.input));
    for line in format_recommendation_lines(&outcome.recommendations) {
        println!("{line}");
    }
    Ok(())
}
