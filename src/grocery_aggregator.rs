use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::recipe_model::{GroceryLine, Quantity, Recipe};

/// One ingredient occurrence behind a shopping list line.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct IngredientSource {
    pub quantity: Option<Quantity>,
    pub unit: Option<String>,
    pub recipe: String,
}

#[derive(Debug, Default)]
struct LineAccumulator {
    quantity: f64,
    unit: String,
    sources: Vec<IngredientSource>,
}

/// Folds the ingredients of every recipe into one sorted shopping list.
///
/// Lines are keyed by the trimmed, lowercased item name. Numeric quantities
/// are summed as-is (units are assumed to agree); the unit shown is the first
/// non-empty one seen. Ingredients without an item name are skipped, and
/// items that only ever had non-numeric quantities appear with quantity 0.
pub fn aggregate(recipes: &[Recipe]) -> Vec<GroceryLine> {
    aggregate_with_sources(recipes)
        .into_iter()
        .map(|(line, _)| line)
        .collect()
}

/// Like `aggregate`, also returning the individual contributions of each line.
pub fn aggregate_with_sources(recipes: &[Recipe]) -> Vec<(GroceryLine, Vec<IngredientSource>)> {
    let mut lines: BTreeMap<String, LineAccumulator> = BTreeMap::new();

    for recipe in recipes {
        for ingredient in &recipe.ingredients {
            let key = ingredient.normalized_item();
            if key.is_empty() {
                continue;
            }
            let line = lines.entry(key).or_default();
            line.sources.push(IngredientSource {
                quantity: ingredient.quantity.clone(),
                unit: ingredient.unit.clone(),
                recipe: recipe.name.clone(),
            });

            if let Some(amount) = ingredient.quantity.as_ref().and_then(Quantity::amount) {
                line.quantity += amount;
            }
            if line.unit.is_empty() {
                if let Some(unit) = ingredient.unit.as_deref().filter(|u| !u.trim().is_empty()) {
                    line.unit = unit.to_string();
                }
            }
        }
    }

    lines
        .into_iter()
        .map(|(item, acc)| {
            let line = GroceryLine {
                item,
                quantity: acc.quantity,
                unit: acc.unit,
                recipes: acc.sources.iter().map(|s| s.recipe.clone()).collect(),
            };
            (line, acc.sources)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe_model::Ingredient;

    fn recipe(name: &str, ingredients: Vec<Ingredient>) -> Recipe {
        Recipe::new(None, name, Some("Pasta")).with_ingredients(ingredients)
    }

    #[test]
    fn test_merges_items_case_insensitively() {
        let recipes = vec![
            recipe("r1", vec![Ingredient::new("Eggs", Some(2.0), Some("whole"))]),
            recipe("r2", vec![Ingredient::new("eggs", Some(3.0), Some("whole"))]),
        ];
        let lines = aggregate(&recipes);
        assert_eq!(
            lines,
            vec![GroceryLine {
                item: "eggs".to_string(),
                quantity: 5.0,
                unit: "whole".to_string(),
                recipes: vec!["r1".to_string(), "r2".to_string()],
            }]
        );
    }

    #[test]
    fn test_lines_sorted_by_item() {
        let recipes = vec![recipe(
            "Stir fry",
            vec![
                Ingredient::new("Onion", Some(1.0), None),
                Ingredient::new("  broccoli ", Some(2.0), Some("cups")),
                Ingredient::new("Garlic", Some(3.0), Some("cloves")),
            ],
        )];
        let items: Vec<String> = aggregate(&recipes).into_iter().map(|l| l.item).collect();
        assert_eq!(items, vec!["broccoli", "garlic", "onion"]);
    }

    #[test]
    fn test_first_non_empty_unit_wins() {
        let recipes = vec![
            recipe("a", vec![Ingredient::new("Rice", Some(1.0), None)]),
            recipe("b", vec![Ingredient::new("rice", Some(2.0), Some(" "))]),
            recipe("c", vec![Ingredient::new("rice", Some(3.0), Some("cups"))]),
            recipe("d", vec![Ingredient::new("rice", Some(100.0), Some("g"))]),
        ];
        let lines = aggregate(&recipes);
        assert_eq!(lines[0].unit, "cups");
        assert_eq!(lines[0].quantity, 106.0);
    }

    #[test]
    fn test_non_numeric_quantities_still_listed() {
        let salt = Ingredient {
            item: "Salt".to_string(),
            quantity: Some(Quantity::Text("to taste".to_string())),
            unit: None,
        };
        let pepper = Ingredient { item: "Pepper".to_string(), quantity: None, unit: Some("pinch".to_string()) };
        let recipes = vec![recipe("Soup", vec![salt, pepper])];
        let lines = aggregate(&recipes);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].item, "pepper");
        assert_eq!(lines[0].quantity, 0.0);
        assert_eq!(lines[0].unit, "pinch");
        assert_eq!(lines[1].item, "salt");
        assert_eq!(lines[1].quantity, 0.0);
        assert_eq!(lines[1].recipes, vec!["Soup".to_string()]);
    }

    #[test]
    fn test_missing_item_names_are_skipped() {
        let recipes = vec![recipe(
            "Mystery",
            vec![
                Ingredient { item: String::new(), quantity: Some(Quantity::Amount(1.0)), unit: None },
                Ingredient::new("   ", Some(2.0), None),
                Ingredient::new("Basil", Some(1.0), Some("bunch")),
            ],
        )];
        let lines = aggregate(&recipes);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].item, "basil");
    }

    #[test]
    fn test_same_recipe_can_contribute_twice() {
        let recipes = vec![recipe(
            "Lasagna",
            vec![
                Ingredient::new("Cheese", Some(1.0), Some("cup")),
                Ingredient::new("cheese", Some(0.5), Some("cup")),
            ],
        )];
        let lines = aggregate(&recipes);
        assert_eq!(lines[0].quantity, 1.5);
        assert_eq!(lines[0].recipes, vec!["Lasagna".to_string(), "Lasagna".to_string()]);
    }

    #[test]
    fn test_input_order_changes_only_provenance() {
        let first = recipe(
            "first",
            vec![
                Ingredient::new("Tomato", Some(2.0), Some("whole")),
                Ingredient::new("Basil", None, Some("leaves")),
            ],
        );
        let second = recipe(
            "second",
            vec![
                Ingredient::new("tomato", Some(3.0), Some("whole")),
                Ingredient::new("Pasta", Some(1.0), Some("lb")),
            ],
        );
        let forward = aggregate(&[first.clone(), second.clone()]);
        let backward = aggregate(&[second, first]);
        assert_eq!(forward.len(), backward.len());
        for (f, b) in forward.iter().zip(&backward) {
            assert_eq!(f.item, b.item);
            assert_eq!(f.quantity, b.quantity);
            assert_eq!(f.unit, b.unit);
        }
        let tomato_forward = forward.iter().find(|l| l.item == "tomato").unwrap();
        let tomato_backward = backward.iter().find(|l| l.item == "tomato").unwrap();
        assert_eq!(tomato_forward.recipes, vec!["first", "second"]);
        assert_eq!(tomato_backward.recipes, vec!["second", "first"]);
    }

    #[test]
    fn test_sources_keep_raw_contributions() {
        let recipes = vec![recipe(
            "Salad",
            vec![Ingredient {
                item: "Lettuce".to_string(),
                quantity: Some(Quantity::Text("1 head".to_string())),
                unit: None,
            }],
        )];
        let with_sources = aggregate_with_sources(&recipes);
        let (_, sources) = &with_sources[0];
        assert_eq!(sources[0].quantity, Some(Quantity::Text("1 head".to_string())));
        assert_eq!(sources[0].recipe, "Salad");
    }
}
