use crate::commands::common::AppContext;
use crate::error::CliError;

pub async fn run_sync(context: &AppContext) -> Result<(), CliError> {
    let store = context.open_store().await?;
    if !store.is_sync_enabled().await {
        return Err(CliError::SyncNotConfigured);
    }

    store.sync().await?;
    println!("Sync complete");
    Ok(())
}
