use smartcrop_core::api::PredictionClient;
use smartcrop_core::pipeline::{SearchOutcome, SearchPipeline};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::commands::common::{format_recommendation_lines, AppContext};
use crate::commands::refresh::prime_search_inputs;
use crate::error::CliError;

const NO_INPUTS: &str =
    "No live prediction is available to search against. Run `smartcrop refresh` to check why.";

pub async fn run_search(
    context: &AppContext,
    query: Option<&str>,
    interactive: bool,
    as_json: bool,
) -> Result<(), CliError> {
    let last_inputs = prime_search_inputs(context).await?;
    let pipeline = SearchPipeline::new(context.predictor()?, last_inputs);
    if interactive {
        return run_interactive(&pipeline, as_json).await;
    }

    match pipeline.search_now(query.unwrap_or_default()).await {
        Some(outcome) => print_outcome(&outcome, as_json),
        None => {
            println!("{NO_INPUTS}");
            Ok(())
        }
    }
}

/// Feed stdin lines through the debounced search loop.
async fn run_interactive(
    pipeline: &SearchPipeline<PredictionClient>,
    as_json: bool,
) -> Result<(), CliError> {
    let (query_tx, query_rx) = mpsc::channel::<String>(16);
    let (outcome_tx, mut outcome_rx) = mpsc::channel::<SearchOutcome>(16);

    let reader = async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if query_tx.send(line).await.is_err() {
                break;
            }
        }
        Ok::<(), CliError>(())
    };
    let printer = async move {
        while let Some(outcome) = outcome_rx.recv().await {
            print_outcome(&outcome, as_json)?;
        }
        Ok::<(), CliError>(())
    };

    let (read_result, (), print_result) =
        tokio::join!(reader, pipeline.run(query_rx, outcome_tx), printer);
    read_result?;
    print_result
}

pub fn print_outcome(outcome: &SearchOutcome, as_json: bool) -> Result<(), CliError> {
    if as_json {
        println!(
            "{}",
            serde_json::to_string(&serde_json::json!({
                "results": outcome.results(),
                "message": outcome.message(),
            }))?
        );
        return Ok(());
    }

    for line in format_search_lines(outcome) {
        println!("{line}");
    }
    Ok(())
}

pub fn format_search_lines(outcome: &SearchOutcome) -> Vec<String> {
    match outcome {
        SearchOutcome::Cleared => vec!["(search cleared)".to_string()],
        SearchOutcome::Found { .. } => format_recommendation_lines(&outcome.results()),
        SearchOutcome::Empty { query, message } => vec![format!("{query}: {message}")],
    }
}
