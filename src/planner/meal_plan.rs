use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::errors::PlanStateError;
use crate::grocery_aggregator::aggregate;
use crate::recipe_model::{GroceryLine, Recipe, ScheduleEntry, DATE_FORMAT};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    Staged,
    Accepted,
    Archived,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Staged => "staged",
            PlanStatus::Accepted => "accepted",
            PlanStatus::Archived => "archived",
        }
    }
}

/// A generated schedule together with its shopping list.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MealPlan {
    pub id: i64,
    pub created_at: NaiveDateTime,
    pub start_date: NaiveDate,
    pub day_count: usize,
    pub recipes: Vec<Recipe>,
    pub grocery_list: Vec<GroceryLine>,
    pub status: PlanStatus,
    #[serde(default)]
    pub accepted_at: Option<NaiveDateTime>,
}

/// One row of a plan's calendar view.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PlannedDay {
    pub day_index: usize,
    pub date: NaiveDate,
    pub weekday: String,
    pub recipe: Recipe,
}

impl MealPlan {
    /// New plans start out staged, with a grocery list built from `recipes`.
    pub fn staged(
        id: i64,
        created_at: NaiveDateTime,
        start_date: NaiveDate,
        day_count: usize,
        recipes: Vec<Recipe>,
    ) -> Self {
        let grocery_list = aggregate(&recipes);
        Self {
            id,
            created_at,
            start_date,
            day_count,
            recipes,
            grocery_list,
            status: PlanStatus::Staged,
            accepted_at: None,
        }
    }

    pub fn day_schedule(&self) -> Vec<PlannedDay> {
        self.recipes
            .iter()
            .enumerate()
            .map(|(day_index, recipe)| {
                let date = self.start_date + Duration::days(day_index as i64);
                PlannedDay {
                    day_index,
                    date,
                    weekday: date.format("%A").to_string(),
                    recipe: recipe.clone(),
                }
            })
            .collect()
    }

    /// Replaces the recipe planned for `day_index` and rebuilds the grocery list.
    pub fn swap_recipe(&mut self, day_index: usize, recipe: Recipe) -> Result<(), PlanStateError> {
        self.ensure_staged()?;
        let day_count = self.recipes.len();
        let slot = self
            .recipes
            .get_mut(day_index)
            .ok_or(PlanStateError::InvalidDayIndex { index: day_index, day_count })?;
        *slot = recipe;
        self.grocery_list = aggregate(&self.recipes);
        Ok(())
    }

    pub fn accept(&mut self, now: NaiveDateTime) -> Result<(), PlanStateError> {
        self.ensure_staged()?;
        self.status = PlanStatus::Accepted;
        self.accepted_at = Some(now);
        Ok(())
    }

    pub fn archive(&mut self) {
        self.status = PlanStatus::Archived;
    }

    /// History record for future recency checks.
    pub fn to_schedule_entry(&self) -> ScheduleEntry {
        ScheduleEntry {
            id: Some(self.id),
            start_date: Some(self.start_date.format(DATE_FORMAT).to_string()),
            day_count: self.day_count as i64,
            recipes: self.recipes.clone(),
            created_at: Some(self.created_at.format(TIMESTAMP_FORMAT).to_string()),
        }
    }

    fn ensure_staged(&self) -> Result<(), PlanStateError> {
        if self.status != PlanStatus::Staged {
            return Err(PlanStateError::NotStaged {
                status: self.status.as_str().to_string(),
            });
        }
        Ok(())
    }
}
