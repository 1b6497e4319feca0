use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use meal_planner::ai_selection::AiSelector;
use meal_planner::api_connection::{ApiConnectionError, Prompt, TextGenerator};
use meal_planner::config::PlannerSettings;
use meal_planner::errors::PlanningError;
use meal_planner::planner::{MealPlanner, PlanRequest, PlanStatus};
use meal_planner::recipe_model::{Ingredient, Recipe, ScheduleEntry};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

/// Reverses whatever list it is shown, by reading the count from the prompt.
struct ReversingGenerator;

#[async_trait]
impl TextGenerator for ReversingGenerator {
    fn name(&self) -> &'static str {
        "reversing"
    }

    async fn generate(&self, prompt: &Prompt) -> Result<String, ApiConnectionError> {
        let count = prompt
            .user
            .lines()
            .filter(|line| line.chars().next().is_some_and(|c| c.is_ascii_digit()))
            .count();
        let order: Vec<String> = (1..=count).rev().map(|i| i.to_string()).collect();
        Ok(format!("```json\n[{}]\n```", order.join(", ")))
    }
}

struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn generate(&self, _prompt: &Prompt) -> Result<String, ApiConnectionError> {
        Err(ApiConnectionError::EmptyResponse)
    }
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn now() -> NaiveDateTime {
    date("2024-03-16").and_hms_opt(12, 0, 0).unwrap()
}

fn catalog() -> Vec<Recipe> {
    let dish = |id: i64, name: &str, category: &str, item: &str, qty: f64| {
        Recipe::new(Some(id), name, Some(category)).with_ingredients(vec![
            Ingredient::new(item, Some(qty), Some("lb")),
            Ingredient::new("Onion", Some(1.0), Some("whole")),
        ])
    };
    vec![
        dish(1, "Spaghetti Bolognese", "Pasta", "Ground beef", 1.0),
        dish(2, "Chicken Tikka", "Chicken", "Chicken thighs", 2.0),
        dish(3, "Carnitas", "Pork", "Pork shoulder", 3.0),
        dish(4, "French Onion Soup", "Soup", "Beef broth", 1.0),
        dish(5, "Three Bean Chili", "Beans", "Kidney beans", 1.0),
        dish(6, "Pepperoni Pizza", "Pizza", "Pizza dough", 1.0),
        dish(7, "Reuben", "Sandwich", "Corned beef", 0.5),
        dish(8, "Ratatouille", "Vegetable", "Eggplant", 2.0),
        dish(9, "Tiramisu", "Dessert", "Mascarpone", 1.0),
    ]
}

fn last_week(recipes: &[Recipe]) -> ScheduleEntry {
    ScheduleEntry {
        id: Some(11),
        start_date: Some("2024-03-11".to_string()),
        day_count: 7,
        recipes: recipes.to_vec(),
        created_at: Some("2024-03-09T18:00:00".to_string()),
    }
}

#[tokio::test]
async fn test_generates_staged_plan_without_recent_recipes() {
    let catalog = catalog();
    let history = vec![last_week(&catalog[0..3])];
    let planner = MealPlanner::new(PlannerSettings::default());
    let request = PlanRequest { start_date: date("2024-03-18"), day_count: 7, use_ai: false };
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    let plan = planner.generate(&catalog, &history, &request, &mut rng, now()).await.unwrap();

    assert_eq!(plan.id, 12);
    assert_eq!(plan.status, PlanStatus::Staged);
    // Eight main dishes, three used last week.
    assert_eq!(plan.recipes.len(), 5);
    let ids: HashSet<i64> = plan.recipes.iter().filter_map(|r| r.id).collect();
    assert_eq!(ids, HashSet::from([4, 5, 6, 7, 8]));

    let onion = plan.grocery_list.iter().find(|l| l.item == "onion").unwrap();
    assert_eq!(onion.quantity, 5.0);
    assert_eq!(onion.unit, "whole");
    assert_eq!(onion.recipes.len(), 5);
    let items: Vec<&str> = plan.grocery_list.iter().map(|l| l.item.as_str()).collect();
    let mut sorted = items.clone();
    sorted.sort();
    assert_eq!(items, sorted);
}

#[tokio::test]
async fn test_ai_selector_reorders_sampled_recipes() {
    let catalog = catalog();
    let request = PlanRequest { start_date: date("2024-03-18"), day_count: 4, use_ai: true };

    let sampled = MealPlanner::new(PlannerSettings::default())
        .select_recipes(&catalog, &[], &request, &mut ChaCha8Rng::seed_from_u64(21))
        .await
        .unwrap();
    let reordered = MealPlanner::new(PlannerSettings::default())
        .with_selector(AiSelector::new(Box::new(ReversingGenerator)))
        .select_recipes(&catalog, &[], &request, &mut ChaCha8Rng::seed_from_u64(21))
        .await
        .unwrap();

    let mut expected = sampled.clone();
    expected.reverse();
    assert_eq!(reordered, expected);
}

#[tokio::test]
async fn test_failing_provider_keeps_sampled_order() {
    let catalog = catalog();
    let request = PlanRequest { start_date: date("2024-03-18"), day_count: 7, use_ai: true };

    let sampled = MealPlanner::new(PlannerSettings::default())
        .select_recipes(&catalog, &[], &request, &mut ChaCha8Rng::seed_from_u64(8))
        .await
        .unwrap();
    let with_failure = MealPlanner::new(PlannerSettings::default())
        .with_selector(AiSelector::new(Box::new(FailingGenerator)))
        .select_recipes(&catalog, &[], &request, &mut ChaCha8Rng::seed_from_u64(8))
        .await
        .unwrap();

    assert_eq!(with_failure, sampled);
}

#[tokio::test]
async fn test_use_ai_false_skips_selector() {
    let catalog = catalog();
    let request = PlanRequest { start_date: date("2024-03-18"), day_count: 4, use_ai: false };
    let plain = MealPlanner::new(PlannerSettings::default())
        .select_recipes(&catalog, &[], &request, &mut ChaCha8Rng::seed_from_u64(3))
        .await
        .unwrap();
    let with_selector = MealPlanner::new(PlannerSettings::default())
        .with_selector(AiSelector::new(Box::new(ReversingGenerator)))
        .select_recipes(&catalog, &[], &request, &mut ChaCha8Rng::seed_from_u64(3))
        .await
        .unwrap();
    assert_eq!(plain, with_selector);
}

#[tokio::test]
async fn test_filter_errors_reach_the_caller() {
    let planner = MealPlanner::new(PlannerSettings::default());
    let request = PlanRequest::new(date("2024-03-18"));

    let desserts = vec![Recipe::new(Some(1), "Pie", Some("Dessert"))];
    let result = planner
        .generate(&desserts, &[], &request, &mut ChaCha8Rng::seed_from_u64(1), now())
        .await;
    assert!(matches!(result, Err(PlanningError::NoCandidates { .. })));

    let catalog = catalog();
    let history = vec![last_week(&catalog)];
    let result = planner
        .generate(&catalog, &history, &request, &mut ChaCha8Rng::seed_from_u64(1), now())
        .await;
    assert!(matches!(result, Err(PlanningError::NoEligibleCandidates { .. })));
}

#[tokio::test]
async fn test_generated_plan_feeds_next_week_history() {
    let catalog = catalog();
    let planner = MealPlanner::new(PlannerSettings::default());
    let first = planner
        .generate(
            &catalog,
            &[],
            &PlanRequest { start_date: date("2024-03-18"), day_count: 4, use_ai: false },
            &mut ChaCha8Rng::seed_from_u64(13),
            now(),
        )
        .await
        .unwrap();

    let history = vec![first.to_schedule_entry()];
    let second = planner
        .generate(
            &catalog,
            &history,
            &PlanRequest { start_date: date("2024-03-22"), day_count: 4, use_ai: false },
            &mut ChaCha8Rng::seed_from_u64(13),
            now(),
        )
        .await
        .unwrap();

    assert_eq!(second.id, first.id + 1);
    let used: HashSet<i64> = first.recipes.iter().filter_map(|r| r.id).collect();
    assert!(second.recipes.iter().all(|r| !used.contains(&r.id.unwrap())));
    assert_eq!(second.recipes.len(), 4);
}
