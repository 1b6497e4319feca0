use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::errors::PlanningError;
use crate::recipe_model::{normalize_name, Recipe, ScheduleEntry};

/// Recipes seen in schedules that overlap the recency window. A catalog
/// recipe is excluded if either its id or its normalized name was seen.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecentlyUsed {
    pub ids: HashSet<i64>,
    pub names: HashSet<String>,
}

impl RecentlyUsed {
    pub fn contains(&self, recipe: &Recipe) -> bool {
        recipe.id.is_some_and(|id| self.ids.contains(&id))
            || self.names.contains(&recipe.normalized_name())
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.names.is_empty()
    }
}

/// Collects the recipes of every schedule whose days intersect
/// `[period_start - lookback_days, period_start - 1]`.
///
/// Schedules without a parsable start date are ignored. A window reaching past
/// the earliest representable date starts at `NaiveDate::MIN`.
pub fn recently_used(
    history: &[ScheduleEntry],
    period_start: NaiveDate,
    lookback_days: i64,
) -> RecentlyUsed {
    let mut used = RecentlyUsed::default();
    if lookback_days < 1 {
        return used;
    }
    let Some(window_end) = period_start.pred_opt() else {
        return used;
    };
    let window_start = Duration::try_days(lookback_days)
        .and_then(|span| period_start.checked_sub_signed(span))
        .unwrap_or(NaiveDate::MIN);

    for entry in history {
        let Some((start, end)) = entry.date_range() else {
            continue;
        };
        if start > window_end || end < window_start {
            continue;
        }
        for recipe in &entry.recipes {
            if let Some(id) = recipe.id {
                used.ids.insert(id);
            }
            let name = normalize_name(&recipe.name);
            if !name.is_empty() {
                used.names.insert(name);
            }
        }
    }
    used
}

/// Narrows the catalog to main dishes that were not used in the recency window.
///
/// # Arguments
/// * `catalog`: every known recipe, in caller order.
/// * `allowed_categories`: exact category names that count as main dishes.
/// * `history`: previously generated schedules.
/// * `period_start`: first day of the schedule being planned.
/// * `lookback_days`: length of the recency window ending the day before `period_start`.
///
/// # Errors
/// `NoCandidates` when no recipe has an allowed category, `NoEligibleCandidates`
/// when every main dish falls inside the recency window.
pub fn filter_candidates(
    catalog: &[Recipe],
    allowed_categories: &[String],
    history: &[ScheduleEntry],
    period_start: NaiveDate,
    lookback_days: i64,
) -> Result<Vec<Recipe>, PlanningError> {
    let main_dishes: Vec<&Recipe> = catalog
        .iter()
        .filter(|recipe| {
            recipe
                .category
                .as_deref()
                .is_some_and(|category| allowed_categories.iter().any(|c| c == category))
        })
        .collect();

    if main_dishes.is_empty() {
        return Err(PlanningError::NoCandidates {
            categories: allowed_categories.join(", "),
        });
    }

    let used = recently_used(history, period_start, lookback_days);
    let candidates: Vec<Recipe> = main_dishes
        .iter()
        .filter(|recipe| !used.contains(recipe))
        .map(|recipe| (*recipe).clone())
        .collect();

    debug!(
        main_dishes = main_dishes.len(),
        excluded = main_dishes.len() - candidates.len(),
        "filtered planning candidates"
    );

    if candidates.is_empty() {
        return Err(PlanningError::NoEligibleCandidates {
            excluded: main_dishes.len(),
            lookback_days,
        });
    }
    Ok(candidates)
}
