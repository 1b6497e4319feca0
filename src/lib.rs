pub mod ai_selection;
pub mod api_connection;
pub mod cli;
pub mod config;
pub mod data_loader;
pub mod errors;
pub mod grocery_aggregator;
pub mod planner;
pub mod recipe_model;
