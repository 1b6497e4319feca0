use chrono::NaiveDate;
use clap::Parser;

use crate::config::{ProviderKind, DEFAULT_DAY_COUNT};

#[derive(Parser, Debug)]
#[command(author, version, about = "Plan a week of main dishes and build the shopping list", long_about = None)]
pub struct Cli {
    /// Path to the recipe catalog (JSON array of recipes)
    #[arg(short, long)]
    pub recipes: String,

    /// Path to previously generated meal plans (JSON array); missing file means no history
    #[arg(long)]
    pub history: Option<String>,

    /// First day of the plan (YYYY-MM-DD), defaults to today
    #[arg(short, long)]
    pub start_date: Option<NaiveDate>,

    /// Number of days to plan
    #[arg(short, long, default_value_t = DEFAULT_DAY_COUNT)]
    pub days: usize,

    /// Skip the AI ordering step and keep the sampled order
    #[arg(long)]
    pub no_ai: bool,

    /// AI provider, overrides AI_PROVIDER
    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    /// AI model, overrides AI_MODEL
    #[arg(long)]
    pub model: Option<String>,

    /// Seed for reproducible recipe sampling
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
