pub mod candidate_filter;
pub mod meal_plan;
pub mod sampler;

pub use candidate_filter::{filter_candidates, recently_used, RecentlyUsed};
pub use meal_plan::{MealPlan, PlanStatus, PlannedDay};
pub use sampler::RecencyWeightedSampler;

use chrono::{NaiveDate, NaiveDateTime};
use rand::Rng;
use tracing::info;

use crate::ai_selection::AiSelector;
use crate::config::{PlannerSettings, DEFAULT_DAY_COUNT};
use crate::errors::PlanningError;
use crate::recipe_model::{Recipe, ScheduleEntry};

#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub start_date: NaiveDate,
    pub day_count: usize,
    /// Let the external model choose the final order when a selector is configured.
    pub use_ai: bool,
}

impl PlanRequest {
    pub fn new(start_date: NaiveDate) -> Self {
        Self { start_date, day_count: DEFAULT_DAY_COUNT, use_ai: true }
    }
}

/// Recipes of the `depth` most recently created schedules, newest schedule
/// first. Schedules without a creation time sort last.
pub fn recent_usage_sequence(history: &[ScheduleEntry], depth: usize) -> Vec<Recipe> {
    let mut ordered: Vec<&ScheduleEntry> = history.iter().collect();
    ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    ordered
        .into_iter()
        .take(depth)
        .flat_map(|entry| entry.recipes.iter().cloned())
        .collect()
}

/// Runs filter, sampling, optional AI ordering and grocery aggregation for
/// one planning request.
pub struct MealPlanner {
    settings: PlannerSettings,
    sampler: RecencyWeightedSampler,
    selector: Option<AiSelector>,
}

impl MealPlanner {
    pub fn new(settings: PlannerSettings) -> Self {
        let sampler = RecencyWeightedSampler::new(settings.decay_base);
        Self { settings, sampler, selector: None }
    }

    pub fn with_selector(mut self, selector: AiSelector) -> Self {
        self.selector = Some(selector);
        self
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    /// Picks recipes for the requested period.
    ///
    /// # Errors
    /// Only the candidate filter can fail; sampling, AI ordering and the
    /// grocery list always produce a result.
    pub async fn select_recipes<R: Rng + ?Sized>(
        &self,
        catalog: &[Recipe],
        history: &[ScheduleEntry],
        request: &PlanRequest,
        rng: &mut R,
    ) -> Result<Vec<Recipe>, PlanningError> {
        let candidates = filter_candidates(
            catalog,
            &self.settings.main_dish_categories,
            history,
            request.start_date,
            self.settings.lookback_days,
        )?;
        let recent = recent_usage_sequence(history, self.settings.history_depth);
        let selected = self.sampler.select(&candidates, &recent, request.day_count, rng);

        match (&self.selector, request.use_ai) {
            (Some(selector), true) => {
                info!(
                    provider = selector.provider_name(),
                    count = selected.len(),
                    "ordering meal plan with AI"
                );
                Ok(selector.select(&selected, selected.len()).await)
            }
            _ => Ok(selected),
        }
    }

    /// Builds a staged plan. Its id follows the highest id in `history`.
    pub async fn generate<R: Rng + ?Sized>(
        &self,
        catalog: &[Recipe],
        history: &[ScheduleEntry],
        request: &PlanRequest,
        rng: &mut R,
        now: NaiveDateTime,
    ) -> Result<MealPlan, PlanningError> {
        let recipes = self.select_recipes(catalog, history, request, rng).await?;
        let id = history.iter().filter_map(|entry| entry.id).max().unwrap_or(0) + 1;
        info!(id, recipes = recipes.len(), start = %request.start_date, "generated meal plan");
        Ok(MealPlan::staged(id, now, request.start_date, request.day_count, recipes))
    }
}
