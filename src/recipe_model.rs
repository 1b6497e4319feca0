use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Date format used for schedule start dates (`2024-03-04`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// An ingredient quantity as it appears in recipe data.
///
/// Only `Amount` takes part in shopping list sums. Free-text amounts such as
/// "a pinch" are kept so they can still be shown next to the item.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Quantity {
    Amount(f64),
    Text(String),
    Other(serde_json::Value),
}

impl Quantity {
    pub fn amount(&self) -> Option<f64> {
        match self {
            Quantity::Amount(value) => Some(*value),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Ingredient {
    // Entries without an item name are tolerated and skipped when aggregating.
    #[serde(default)]
    pub item: String,
    #[serde(default)]
    pub quantity: Option<Quantity>,
    #[serde(default)]
    pub unit: Option<String>,
}

impl Ingredient {
    pub fn new(item: &str, quantity: Option<f64>, unit: Option<&str>) -> Self {
        Self {
            item: item.to_string(),
            quantity: quantity.map(Quantity::Amount),
            unit: unit.map(str::to_string),
        }
    }

    /// Join key for shopping list lines: trimmed and lowercased item name.
    pub fn normalized_item(&self) -> String {
        normalize_name(&self.item)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Recipe {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

/// Identity used for deduplication and recency weighting: the numeric id when
/// the record carries one, otherwise the normalized name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecipeIdentity {
    Id(i64),
    Name(String),
}

impl Recipe {
    pub fn new(id: Option<i64>, name: &str, category: Option<&str>) -> Self {
        Self {
            id,
            name: name.to_string(),
            category: category.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_ingredients(mut self, ingredients: Vec<Ingredient>) -> Self {
        self.ingredients = ingredients;
        self
    }

    pub fn identity(&self) -> RecipeIdentity {
        match self.id {
            Some(id) => RecipeIdentity::Id(id),
            None => RecipeIdentity::Name(self.normalized_name()),
        }
    }

    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

/// Trims and lowercases a name so that "  Eggs" and "eggs" compare equal.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A previously generated schedule, read only by the planner.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ScheduleEntry {
    #[serde(default)]
    pub id: Option<i64>,
    /// Raw start date; entries whose date does not parse are skipped by the
    /// recency window instead of failing the whole history.
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(alias = "days", default)]
    pub day_count: i64,
    #[serde(default)]
    pub recipes: Vec<Recipe>,
    /// ISO-8601 creation timestamp, used to order history most recent first.
    #[serde(default)]
    pub created_at: Option<String>,
}

impl ScheduleEntry {
    pub fn start(&self) -> Option<NaiveDate> {
        let raw = self.start_date.as_deref()?;
        NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
    }

    /// Inclusive `[start, start + day_count - 1]`, or `None` when the start date
    /// is missing or unparsable or the schedule covers no days. An end past the
    /// last representable date is clamped to `NaiveDate::MAX`.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = self.start()?;
        if self.day_count < 1 {
            return None;
        }
        let end = Duration::try_days(self.day_count - 1)
            .and_then(|span| start.checked_add_signed(span))
            .unwrap_or(NaiveDate::MAX);
        Some((start, end))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GroceryLine {
    pub item: String,
    pub quantity: f64,
    pub unit: String,
    pub recipes: Vec<String>,
}
