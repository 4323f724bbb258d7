use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use smartcrop_core::{Season, SoilType};

#[derive(Parser)]
#[command(name = "smartcrop")]
#[command(about = "Weather-driven crop recommendations for smallholder farmers")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch live weather and recommend crops for the current season
    Refresh {
        /// Soil type (defaults to the profile soil, or Loam)
        #[arg(long, value_enum)]
        soil: Option<SoilArg>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Recommend crops for manually entered conditions
    Analyze {
        #[arg(long, value_enum)]
        season: SeasonArg,
        #[arg(long, value_enum)]
        soil: SoilArg,
        /// Temperature in degrees Celsius
        #[arg(long, value_name = "CELSIUS", allow_hyphen_values = true)]
        temperature: String,
        /// Rainfall in millimetres
        #[arg(long, value_name = "MM", allow_hyphen_values = true)]
        rainfall: String,
        /// Save the result to history (requires sign-in)
        #[arg(long)]
        save: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search for a crop under the latest conditions
    Search {
        /// Crop name or fragment
        query: Option<String>,
        /// Read queries line by line from stdin
        #[arg(long, conflicts_with = "query")]
        interactive: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ask the AI farming advisor
    Ask {
        /// Question text
        question: Vec<String>,
        /// Ask one of the quick prompts (1-based)
        #[arg(long, value_name = "N", conflicts_with = "question")]
        prompt: Option<usize>,
        /// List the quick prompts
        #[arg(long, conflicts_with_all = ["question", "prompt"])]
        list_prompts: bool,
    },
    /// Browse saved predictions
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
    /// Show or edit the signed-in user's profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Show or change device preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommands,
    },
    /// Sync local replica with remote Turso database
    Sync,
    /// Manage the Supabase account session
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SeasonArg {
    First,
    Second,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SoilArg {
    Loam,
    Clay,
    Sandy,
}

impl From<SeasonArg> for Season {
    fn from(value: SeasonArg) -> Self {
        match value {
            SeasonArg::First => Self::First,
            SeasonArg::Second => Self::Second,
        }
    }
}

impl From<SoilArg> for SoilType {
    fn from(value: SoilArg) -> Self {
        match value {
            SoilArg::Loam => Self::Loam,
            SoilArg::Clay => Self::Clay,
            SoilArg::Sandy => Self::Sandy,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum PreferenceKey {
    DarkMode,
    Tips,
    WeatherAlerts,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List saved predictions
    List {
        /// Only records created in this year
        #[arg(long)]
        year: Option<i32>,
        /// Only records created in this month (1-12)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the years that have saved predictions
    Years,
    /// Delete a saved prediction
    Delete {
        /// Record ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show the profile
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update profile fields; omitted fields are kept
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_enum)]
        soil: Option<SoilArg>,
        #[arg(long)]
        region: Option<String>,
        /// Photo URI (empty string removes it)
        #[arg(long, value_name = "URI")]
        photo: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum PrefsCommands {
    /// Show preferences and scheduled notifications
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change a preference
    Set {
        #[arg(value_enum)]
        key: PreferenceKey,
        #[arg(value_enum)]
        value: Toggle,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Sign in with email/password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        /// Accept the terms of use
        #[arg(long)]
        accept_terms: bool,
    },
    /// Sign out and clear the stored session
    Logout,
    /// Show whether a session is stored
    Status,
    /// Send a password reset email
    ResetPassword {
        #[arg(long)]
        email: String,
    },
    /// Send the verification email again
    ResendVerification,
    /// Re-read the account and report email verification
    Reload,
    /// Exchange the refresh token for a new session
    Refresh,
}
