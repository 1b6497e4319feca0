use thiserror::Error;

/// Failures that stop a planning request before any recipe is chosen.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanningError {
    /// The catalog holds no recipe in the main dish categories.
    #[error("no main dish recipes available (allowed categories: {categories})")]
    NoCandidates { categories: String },
    /// Main dishes exist but every one of them was used inside the recency window.
    #[error("all {excluded} main dish recipes were used in the last {lookback_days} days")]
    NoEligibleCandidates { excluded: usize, lookback_days: i64 },
}

/// Invalid transitions or edits on a generated meal plan.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanStateError {
    #[error("meal plan is {status}, only staged plans can be changed")]
    NotStaged { status: String },
    #[error("day index {index} is out of range for a {day_count}-day plan")]
    InvalidDayIndex { index: usize, day_count: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported AI provider '{0}' (expected 'openai' or 'gemini')")]
    UnknownProvider(String),
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}
