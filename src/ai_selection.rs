use std::collections::HashSet;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api_connection::{ApiConnectionError, Prompt, TextGenerator};
use crate::recipe_model::Recipe;

pub const SYSTEM_INSTRUCTION: &str =
    "You are a helpful meal planning assistant. Always respond with valid JSON only.";

const MISSING_DESCRIPTION: &str = "No description";

/// Why a model response could not be used. Never escapes `AiSelector::select`.
#[derive(Debug, Error)]
pub enum SelectionFailure {
    #[error("provider call failed: {0}")]
    Provider(#[from] ApiConnectionError),
    #[error("provider returned an empty response")]
    EmptyResponse,
    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("response JSON is not an array")]
    NotAList,
}

/// Asks an external model to choose and order recipes, repairing what it can
/// of the answer and falling back to input order for anything else.
pub struct AiSelector {
    generator: Box<dyn TextGenerator>,
}

impl AiSelector {
    pub fn new(generator: Box<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub fn provider_name(&self) -> &'static str {
        self.generator.name()
    }

    /// Returns exactly `min(target_count, candidates.len())` distinct candidates.
    ///
    /// The provider is called at most once. Any failure (transport, status,
    /// unparsable or wrongly shaped output) is logged and answered with the
    /// first `target_count` candidates in input order.
    pub async fn select(&self, candidates: &[Recipe], target_count: usize) -> Vec<Recipe> {
        let target = target_count.min(candidates.len());
        if target == 0 {
            return Vec::new();
        }

        match self.try_select(candidates, target).await {
            Ok(selected) => selected,
            Err(reason) => {
                warn!(
                    provider = self.provider_name(),
                    %reason,
                    "AI meal plan selection failed, using fallback order"
                );
                fallback_order(candidates, target)
            }
        }
    }

    async fn try_select(
        &self,
        candidates: &[Recipe],
        target: usize,
    ) -> Result<Vec<Recipe>, SelectionFailure> {
        let prompt = build_selection_prompt(candidates, target);
        let raw = self.generator.generate(&prompt).await?;
        let values = parse_index_list(&raw)?;
        let indices = resolve_indices(&values, candidates.len(), target);
        Ok(indices.into_iter().map(|k| candidates[k - 1].clone()).collect())
    }
}

/// Deterministic answer used whenever the model's choice cannot be trusted.
pub fn fallback_order(candidates: &[Recipe], target_count: usize) -> Vec<Recipe> {
    candidates.iter().take(target_count).cloned().collect()
}

pub fn build_selection_prompt(candidates: &[Recipe], target_count: usize) -> Prompt {
    let listing = candidates
        .iter()
        .enumerate()
        .map(|(i, recipe)| {
            format!(
                "{}. {}: {}",
                i + 1,
                recipe.name,
                recipe.description.as_deref().unwrap_or(MISSING_DESCRIPTION)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let user = format!(
        "Choose exactly {target_count} different main dish recipes from the numbered list below, \
one per day, and put them in the best order to eat them over the {target_count} days.
Consider variety, nutritional balance, and typical weekly eating patterns. Use each number at most once.

Recipes:
{listing}

Respond with ONLY a JSON array of {target_count} unique recipe numbers (e.g., [3, 1, 2]).
Do not include any other text or explanation."
    );

    Prompt { system: SYSTEM_INSTRUCTION.to_string(), user }
}

/// Removes surrounding whitespace and Markdown code fences (```` ```json ````).
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // Drop the fence line, including an optional language tag.
        text = match rest.split_once('\n') {
            Some((_, body)) => body,
            None => rest.trim_start_matches("json"),
        };
        text = text.trim();
        if let Some(body) = text.strip_suffix("```") {
            text = body.trim();
        }
    }
    text
}

/// Parses the model output as a JSON array, repairing one common truncation:
/// an array cut off before its closing bracket.
pub fn parse_index_list(raw: &str) -> Result<Vec<Value>, SelectionFailure> {
    let text = strip_code_fences(raw);
    if text.is_empty() {
        return Err(SelectionFailure::EmptyResponse);
    }

    let parsed = match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(err) => {
            debug!(response = text, error = %err, "failed to parse AI response as JSON");
            if !(text.starts_with('[') && !text.ends_with(']')) {
                return Err(SelectionFailure::InvalidJson(err.to_string()));
            }
            let repaired = format!(
                "{}]",
                text.trim_end_matches(|c: char| c == ',' || c.is_whitespace())
            );
            let value = serde_json::from_str::<Value>(&repaired)
                .map_err(|e| SelectionFailure::InvalidJson(e.to_string()))?;
            info!(repaired = %repaired, "repaired truncated AI response");
            value
        }
    };

    match parsed {
        Value::Array(values) => Ok(values),
        _ => Err(SelectionFailure::NotAList),
    }
}

/// Turns the model's numbers into `target` distinct 1-based indices.
///
/// Keeps the first occurrence of each in-range integer, in response order,
/// then tops up with the lowest unused indices.
pub fn resolve_indices(values: &[Value], candidate_count: usize, target: usize) -> Vec<usize> {
    let target = target.min(candidate_count);
    let mut kept = Vec::with_capacity(target);
    let mut seen = HashSet::new();

    for value in values {
        if kept.len() == target {
            break;
        }
        let Some(k) = value.as_i64() else {
            continue;
        };
        if k < 1 || k as u64 > candidate_count as u64 {
            continue;
        }
        let k = k as usize;
        if seen.insert(k) {
            kept.push(k);
        }
    }

    if kept.len() < target {
        debug!(valid = kept.len(), target, "filling AI selection from unused recipes");
    }
    for k in 1..=candidate_count {
        if kept.len() == target {
            break;
        }
        if seen.insert(k) {
            kept.push(k);
        }
    }
    kept
}
