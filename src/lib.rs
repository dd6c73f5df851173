//! Mealtrack Library
//!
//! Calorie and meal tracking on a local SQLite store, with live queries
//! and food database lookups.

pub mod api;
pub mod auth;
pub mod commands;
pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod models;

pub use api::{FoodApi, FoodDetails, FoodResult, FoodSearcher, OpenFoodApi, Provider, UsdaApi};
pub use config::{Config, ConfigError};
pub use db::{DayRepository, Listener, MealRepository, Store, UserRepository};
pub use error::{RetrievalError, StoreError};
pub use models::{DayEntry, FoodItem, MacroTotals, MealEntry, User};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
