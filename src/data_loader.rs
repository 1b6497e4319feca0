use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::recipe_model::{Recipe, ScheduleEntry};

fn load_json_list<T: DeserializeOwned>(path: &Path, what: &str) -> Result<Vec<T>> {
    if !path.exists() {
        return Err(anyhow::anyhow!("{} file not found at: {:?}", what, path));
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} file at {:?}", what, path))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {} JSON from {:?}", what, path))
}

/// Loads the recipe catalog: a JSON array of recipe objects.
pub fn load_recipes(path: &Path) -> Result<Vec<Recipe>> {
    let recipes: Vec<Recipe> = load_json_list(path, "Recipe")?;
    if recipes.is_empty() {
        return Err(anyhow::anyhow!("No recipes available in {:?}", path));
    }
    Ok(recipes)
}

/// Loads previously generated schedules. A missing file means no history.
pub fn load_history(path: &Path) -> Result<Vec<ScheduleEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    load_json_list(path, "Meal plan history")
}
