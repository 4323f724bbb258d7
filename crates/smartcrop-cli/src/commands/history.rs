use smartcrop_core::models::{available_years, HistoryFilter};
use smartcrop_core::util::unix_millis_now;

use crate::cli::HistoryCommands;
use crate::commands::common::{
    format_history_lines, history_to_list_item, parse_record_id, AppContext, HistoryListItem,
};
use crate::error::CliError;

const SIGNED_OUT: &str = "Sign in to see your saved predictions.";

pub async fn run_history(context: &AppContext, command: HistoryCommands) -> Result<(), CliError> {
    let store = context.open_store().await?;
    let account = context.open_account(&store).await?;
    let owner_id = account
        .as_ref()
        .and_then(|account| account.current_user_id().map(str::to_string));

    match command {
        HistoryCommands::List { year, month, json } => {
            let records = match owner_id.as_deref() {
                Some(owner_id) => {
                    store
                        .filtered_history(owner_id, &HistoryFilter { year, month })
                        .await?
                }
                None => Vec::new(),
            };

            let now_ms = unix_millis_now();
            if json {
                let items = records
                    .iter()
                    .map(|record| history_to_list_item(record, now_ms))
                    .collect::<Vec<HistoryListItem>>();
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else if owner_id.is_none() {
                println!("{SIGNED_OUT}");
            } else if records.is_empty() {
                println!("No saved predictions.");
            } else {
                for line in format_history_lines(&records, now_ms) {
                    println!("{line}");
                }
            }
        }
        HistoryCommands::Years => {
            let Some(owner_id) = owner_id.as_deref() else {
                println!("{SIGNED_OUT}");
                return Ok(());
            };
            let records = store.list_history(owner_id).await?;
            for year in available_years(&records) {
                println!("{year}");
            }
        }
        HistoryCommands::Delete { id } => {
            let id = parse_record_id(&id)?;
            let owner_id = owner_id.ok_or(CliError::SignInRequired)?;
            let owned = store
                .get_history_record(&id)
                .await?
                .is_some_and(|record| record.owner_id == owner_id);
            if !owned {
                return Err(smartcrop_core::Error::NotFound(id.to_string()).into());
            }
            store.delete_history_record(&id).await?;
            println!("Deleted prediction {id}");
        }
    }
    Ok(())
}
