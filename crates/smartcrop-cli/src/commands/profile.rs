use smartcrop_core::models::{Profile, ProfileUpdate};

use crate::cli::ProfileCommands;
use crate::commands::common::AppContext;
use crate::error::CliError;

pub async fn run_profile(context: &AppContext, command: ProfileCommands) -> Result<(), CliError> {
    let store = context.open_store().await?;
    let mut account = context.require_account(&store).await?;

    match command {
        ProfileCommands::Show { json } => {
            let profile = account.profile().ok_or(CliError::SignInRequired)?;
            if json {
                println!("{}", serde_json::to_string_pretty(profile)?);
            } else {
                for line in format_profile_lines(profile) {
                    println!("{line}");
                }
            }
        }
        ProfileCommands::Update {
            name,
            soil,
            region,
            photo,
        } => {
            let update = ProfileUpdate {
                name,
                soil_type: soil.map(Into::into),
                region,
                photo: photo.map(Some),
            };
            if update.is_empty() {
                println!("Nothing to update.");
                return Ok(());
            }
            if !account.is_signed_in() {
                return Err(CliError::SignInRequired);
            }
            let profile = account.update_profile(&update).await?;
            println!("Profile saved.");
            for line in format_profile_lines(profile) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

pub fn format_profile_lines(profile: &Profile) -> Vec<String> {
    vec![
        format!("Name:   {}", profile.name),
        format!("Soil:   {}", profile.soil_type),
        format!("Region: {}", profile.region),
        format!("Photo:  {}", profile.photo.as_deref().unwrap_or("(none)")),
    ]
}
