//! Normalized access to the two remote food databases.
//!
//! Both providers answer the same two questions behind the [`FoodApi`]
//! interface: search a page of foods, and fetch nutrition for one of
//! them. Callers hold a [`Provider`] tag and dispatch through
//! [`FoodSearcher`]. Pagination is caller-driven from page 0, with
//! result pages concatenated on the caller's side.

mod open_food;
mod usda;

pub use open_food::OpenFoodApi;
pub use usda::UsdaApi;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::str::FromStr;

use crate::error::RetrievalError;
use crate::models::FoodItem;

/// Which remote food database a result came from and where follow-up
/// detail requests must go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provider {
    Usda,
    OpenFoodData,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Usda => write!(f, "USDA"),
            Provider::OpenFoodData => write!(f, "Open Food Data"),
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "usda" => Ok(Provider::Usda),
            "ofd" | "off" | "open-food-data" | "open food data" => Ok(Provider::OpenFoodData),
            _ => Err(format!(
                "Invalid provider '{}'. Valid options: usda, ofd",
                s
            )),
        }
    }
}

/// One row of a search page, normalized across providers. `id` is the
/// provider-specific key to pass to `get_details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodResult {
    pub id: String,
    pub api: Provider,
    pub description: String,
}

/// Per-portion nutrition for one food, normalized across providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodDetails {
    pub name: String,
    pub portion: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl From<FoodDetails> for FoodItem {
    fn from(details: FoodDetails) -> Self {
        FoodItem::new(
            details.name,
            details.portion,
            details.calories,
            details.protein,
            details.carbs,
            details.fats,
        )
    }
}

/// The interface both food databases are reached through.
///
/// Failures are undifferentiated [`RetrievalError`]s and are never retried
/// here. Empty-query suppression is the caller's job. All methods return
/// `Send` futures.
pub trait FoodApi {
    /// One page of results for `query`, pages counted from 0. The locale
    /// flag picks the French or American catalog where the provider
    /// distinguishes them and is ignored otherwise.
    fn search(
        &self,
        query: &str,
        france_locale: bool,
        page: u32,
    ) -> impl Future<Output = Result<Vec<FoodResult>, RetrievalError>> + Send;

    /// Nutrition detail for one search result's `id`.
    fn get_details(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<FoodDetails, RetrievalError>> + Send;
}

/// One configured instance of each provider, dispatched by [`Provider`]
/// tag.
pub struct FoodSearcher {
    usda: UsdaApi,
    open_food: OpenFoodApi,
}

impl FoodSearcher {
    pub fn new(usda_api_key: impl Into<String>) -> Self {
        Self {
            usda: UsdaApi::new(usda_api_key),
            open_food: OpenFoodApi::new(),
        }
    }

    pub async fn search(
        &self,
        provider: Provider,
        query: &str,
        france_locale: bool,
        page: u32,
    ) -> Result<Vec<FoodResult>, RetrievalError> {
        match provider {
            Provider::Usda => self.usda.search(query, france_locale, page).await,
            Provider::OpenFoodData => self.open_food.search(query, france_locale, page).await,
        }
    }

    pub async fn get_details(
        &self,
        provider: Provider,
        id: &str,
    ) -> Result<FoodDetails, RetrievalError> {
        match provider {
            Provider::Usda => self.usda.get_details(id).await,
            Provider::OpenFoodData => self.open_food.get_details(id).await,
        }
    }
}
