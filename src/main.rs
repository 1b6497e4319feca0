use anyhow::{Context, Result};
use chrono::Local;
use meal_planner::ai_selection::AiSelector;
use meal_planner::api_connection::build_generator;
use meal_planner::cli::parse_args;
use meal_planner::config::{AiSettings, PlannerSettings};
use meal_planner::data_loader::{load_history, load_recipes};
use meal_planner::planner::{MealPlanner, PlanRequest};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok(); // Load .env file for API keys

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli_args = parse_args();

    let catalog = load_recipes(Path::new(&cli_args.recipes))?;
    let history = match &cli_args.history {
        Some(path) => load_history(Path::new(path))?,
        None => Vec::new(),
    };
    info!(recipes = catalog.len(), plans = history.len(), "loaded planning data");

    let mut planner = MealPlanner::new(PlannerSettings::default());
    if !cli_args.no_ai {
        let mut ai_settings = AiSettings::from_env().context("Invalid AI configuration")?;
        if let Some(provider) = cli_args.provider {
            ai_settings = ai_settings.with_provider(provider);
        }
        if let Some(model) = &cli_args.model {
            ai_settings = ai_settings.with_model(model);
        }
        match build_generator(&ai_settings) {
            Ok(generator) => planner = planner.with_selector(AiSelector::new(generator)),
            Err(e) => warn!(error = %e, "AI provider unavailable, keeping sampled order"),
        }
    }

    let now = Local::now().naive_local();
    let request = PlanRequest {
        start_date: cli_args.start_date.unwrap_or_else(|| now.date()),
        day_count: cli_args.days,
        use_ai: !cli_args.no_ai,
    };

    let mut rng = match cli_args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let plan = planner
        .generate(&catalog, &history, &request, &mut rng, now)
        .await
        .context("Meal plan generation failed")?;

    let output = json!({
        "plan": plan,
        "days": plan.day_schedule(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
