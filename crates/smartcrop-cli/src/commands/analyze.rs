use smartcrop_core::pipeline::{save_status_message, AnalysisPipeline, AnalysisResult, LastInputs};
use smartcrop_core::{Season, SoilType};

use crate::commands::common::{
    format_input_summary, format_recommendation_lines, Account, AppContext,
};
use crate::error::CliError;

pub struct AnalyzeRequest<'a> {
    pub season: Season,
    pub soil: SoilType,
    pub temperature: &'a str,
    pub rainfall: &'a str,
    pub save: bool,
    pub as_json: bool,
}

pub async fn run_analyze(
    context: &AppContext,
    request: AnalyzeRequest<'_>,
) -> Result<(), CliError> {
    let store = context.open_store().await?;
    let pipeline = AnalysisPipeline::new(context.predictor()?, store.clone(), LastInputs::new());

    let result = match pipeline
        .analyze(
            request.season,
            request.soil,
            request.temperature,
            request.rainfall,
        )
        .await
    {
        Ok(result) => result,
        Err(error) => {
            println!("{error}");
            return Ok(());
        }
    };
    print_analysis(&result, request.as_json)?;

    if request.save {
        let account = context.open_account(&store).await?;
        let owner_id = account.as_ref().and_then(Account::current_user_id);
        let saved = pipeline.save(owner_id, &result).await;
        if let Ok(record) = &saved {
            tracing::debug!(id = %record.id, "Saved analysis");
        }
        println!("{}", save_status_message(&saved));
    }
    Ok(())
}

fn print_analysis(result: &AnalysisResult, as_json: bool) -> Result<(), CliError> {
    if as_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "input": result.input,
                "recommendations": result.recommendations,
                "error": result.error,
            }))?
        );
        return Ok(());
    }

    if let Some(error) = &result.error {
        println!("{error}");
    }
    println!("Inputs: {}", format_input_summary(&result.input));
    for line in format_recommendation_lines(&result.recommendations) {
        println!("{line}");
    }
    Ok(())
}
