use serde::Deserialize;

use super::{FoodApi, FoodDetails, FoodResult, Provider};
use crate::error::RetrievalError;

const BASE_URL: &str = "https://api.nal.usda.gov/fdc/v1";

// FoodData Central reports nutrients per 100 g unless a serving size is
// declared; amounts are keyed by the USDA nutrient number.
const NUTRIENT_PROTEIN: &str = "203";
const NUTRIENT_FAT: &str = "204";
const NUTRIENT_CARBS: &str = "205";
const NUTRIENT_ENERGY_KCAL: &str = "208";

/// USDA FoodData Central. Requires an API key; the public `DEMO_KEY` works
/// with tight rate limits. The catalog has no locale split, so the flag is
/// ignored.
pub struct UsdaApi {
    client: reqwest::Client,
    api_key: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<SearchFood>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchFood {
    fdc_id: i64,
    description: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FoodResponse {
    description: String,
    serving_size: Option<f64>,
    serving_size_unit: Option<String>,
    #[serde(default)]
    food_nutrients: Vec<FoodNutrient>,
}

#[derive(Deserialize)]
struct FoodNutrient {
    nutrient: NutrientRef,
    amount: Option<f64>,
}

#[derive(Deserialize)]
struct NutrientRef {
    number: String,
}

fn map_search(body: SearchResponse) -> Vec<FoodResult> {
    body.foods
        .into_iter()
        .map(|food| FoodResult {
            id: food.fdc_id.to_string(),
            api: Provider::Usda,
            description: food.description,
        })
        .collect()
}

fn map_details(food: FoodResponse) -> FoodDetails {
    let mut calories = 0.0;
    let mut protein = 0.0;
    let mut carbs = 0.0;
    let mut fats = 0.0;

    for entry in &food.food_nutrients {
        if let Some(amount) = entry.amount {
            match entry.nutrient.number.as_str() {
                NUTRIENT_PROTEIN => protein = amount,
                NUTRIENT_FAT => fats = amount,
                NUTRIENT_CARBS => carbs = amount,
                NUTRIENT_ENERGY_KCAL => calories = amount,
                _ => {}
            }
        }
    }

    let portion = match (food.serving_size, food.serving_size_unit.as_deref()) {
        (Some(size), Some(unit)) => format!("{} {}", size, unit),
        _ => "100 g".to_string(),
    };

    FoodDetails {
        name: food.description,
        portion,
        calories,
        protein,
        carbs,
        fats,
    }
}

impl UsdaApi {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }
}

impl FoodApi for UsdaApi {
    async fn search(
        &self,
        query: &str,
        _france_locale: bool,
        page: u32,
    ) -> Result<Vec<FoodResult>, RetrievalError> {
        // FoodData Central pages are 1-based.
        let page_number = (page + 1).to_string();
        let response = self
            .client
            .get(format!("{}/foods/search", BASE_URL))
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("query", query),
                ("pageNumber", &page_number),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RetrievalError::new(format!(
                "USDA search returned status {}",
                response.status()
            )));
        }

        let body: SearchResponse = response.json().await?;
        Ok(map_search(body))
    }

    async fn get_details(&self, id: &str) -> Result<FoodDetails, RetrievalError> {
        let response = self
            .client
            .get(format!("{}/food/{}", BASE_URL, id))
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RetrievalError::new(format!(
                "USDA food {} returned status {}",
                id,
                response.status()
            )));
        }

        let body: FoodResponse = response.json().await?;
        Ok(map_details(body))
    }
}
