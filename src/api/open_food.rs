use serde_json::Value;

use super::{FoodApi, FoodDetails, FoodResult, Provider};
use crate::error::RetrievalError;

const DETAILS_HOST: &str = "https://world.openfoodfacts.org";

/// Open Food Facts. Keyless; searches go against the American or French
/// catalog depending on the locale flag, detail lookups (by barcode)
/// against the world catalog.
pub struct OpenFoodApi {
    client: reqwest::Client,
}

fn search_host(france_locale: bool) -> &'static str {
    if france_locale {
        "https://fr.openfoodfacts.org"
    } else {
        "https://us.openfoodfacts.org"
    }
}

/// Nutriment values arrive as numbers or as number-shaped strings
/// depending on the product.
fn nutriment(nutriments: &Value, key: &str) -> Option<f64> {
    let value = nutriments.get(key)?;
    value
        .as_f64()
        .or_else(|| value.as_str()?.trim().parse().ok())
}

fn map_search(body: &Value) -> Vec<FoodResult> {
    let products = match body["products"].as_array() {
        Some(products) => products,
        None => return Vec::new(),
    };

    products
        .iter()
        .map(|product| FoodResult {
            id: product["code"].as_str().unwrap_or_default().to_string(),
            api: Provider::OpenFoodData,
            description: product["product_name"].as_str().unwrap_or_default().to_string(),
        })
        .collect()
}

fn per_serving(name: &str, serving: &str, nutriments: &Value) -> Option<FoodDetails> {
    Some(FoodDetails {
        name: name.to_string(),
        portion: serving.to_string(),
        calories: nutriment(nutriments, "energy-kcal_serving")?,
        protein: nutriment(nutriments, "proteins_serving")?,
        carbs: nutriment(nutriments, "carbohydrates_serving")?,
        fats: nutriment(nutriments, "fat_serving")?,
    })
}

/// Prefers the declared serving when the product carries a serving size
/// and all four per-serving figures; otherwise falls back to per 100 g.
fn map_details(product: &Value) -> FoodDetails {
    let name = product["product_name"].as_str().unwrap_or_default().to_string();
    let nutriments = &product["nutriments"];

    if let Some(serving) = product["serving_size"].as_str() {
        if let Some(details) = per_serving(&name, serving, nutriments) {
            return details;
        }
    }

    FoodDetails {
        name,
        portion: "100 g".to_string(),
        calories: nutriment(nutriments, "energy-kcal_100g").unwrap_or(0.0),
        protein: nutriment(nutriments, "proteins_100g").unwrap_or(0.0),
        carbs: nutriment(nutriments, "carbohydrates_100g").unwrap_or(0.0),
        fats: nutriment(nutriments, "fat_100g").unwrap_or(0.0),
    }
}

impl OpenFoodApi {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for OpenFoodApi {
    fn default() -> Self {
        Self::new()
    }
}

impl FoodApi for OpenFoodApi {
    async fn search(
        &self,
        query: &str,
        france_locale: bool,
        page: u32,
    ) -> Result<Vec<FoodResult>, RetrievalError> {
        // The search endpoint counts pages from 1.
        let page_number = (page + 1).to_string();
        let response = self
            .client
            .get(format!("{}/cgi/search.pl", search_host(france_locale)))
            .query(&[
                ("search_terms", query),
                ("search_simple", "1"),
                ("action", "process"),
                ("json", "1"),
                ("page", &page_number),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RetrievalError::new(format!(
                "Open Food Facts search returned status {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        Ok(map_search(&body))
    }

    async fn get_details(&self, id: &str) -> Result<FoodDetails, RetrievalError> {
        let response = self
            .client
            .get(format!("{}/api/v0/product/{}.json", DETAILS_HOST, id))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RetrievalError::new(format!(
                "Open Food Facts product {} returned status {}",
                id,
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        if body["status"].as_i64() != Some(1) {
            return Err(RetrievalError::new(format!(
                "no product found for barcode '{}'",
                id
            )));
        }

        Ok(map_details(&body["product"]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_host_follows_locale() {
        assert_eq!(search_host(true), "https://fr.openfoodfacts.org");
        assert_eq!(search_host(false), "https://us.openfoodfacts.org");
    }

    #[test]
    fn test_map_search_results() {
        let body: Value = serde_json::from_str(
            r#"{
                "count": 2,
                "products": [
                    {"code": "3017620422003", "product_name": "Nutella", "brands": "Ferrero"},
                    {"code": "737628064502", "product_name": ""}
                ]
            }"#,
        )
        .unwrap();

        let results = map_search(&body);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "3017620422003");
        assert_eq!(results[0].api, Provider::OpenFoodData);
        assert_eq!(results[0].description, "Nutella");
        assert_eq!(results[1].description, "");
    }

    #[test]
    fn test_map_search_without_products_is_empty() {
        let body: Value = serde_json::from_str(r#"{"count": 0}"#).unwrap();
        assert!(map_search(&body).is_empty());
    }

    #[test]
    fn test_map_details_prefers_the_declared_serving() {
        let product: Value = serde_json::from_str(
            r#"{
                "product_name": "Nutella",
                "serving_size": "15 g",
                "nutriments": {
                    "energy-kcal_serving": 80.7,
                    "proteins_serving": 0.9,
                    "carbohydrates_serving": 8.6,
                    "fat_serving": 4.7,
                    "energy-kcal_100g": 538.0,
                    "proteins_100g": 6.3,
                    "carbohydrates_100g": 57.5,
                    "fat_100g": 30.9
                }
            }"#,
        )
        .unwrap();

        let details = map_details(&product);
        assert_eq!(details.name, "Nutella");
        assert_eq!(details.portion, "15 g");
        assert_eq!(details.calories, 80.7);
        assert_eq!(details.protein, 0.9);
        assert_eq!(details.carbs, 8.6);
        assert_eq!(details.fats, 4.7);
    }

    #[test]
    fn test_map_details_falls_back_to_per_100g() {
        // Serving size declared but the per-serving figures are partial.
        let product: Value = serde_json::from_str(
            r#"{
                "product_name": "Orange juice",
                "serving_size": "250 ml",
                "nutriments": {
                    "energy-kcal_serving": 112.0,
                    "energy-kcal_100g": 45.0,
                    "proteins_100g": 0.7,
                    "carbohydrates_100g": 10.4,
                    "fat_100g": 0.2
                }
            }"#,
        )
        .unwrap();

        let details = map_details(&product);
        assert_eq!(details.portion, "100 g");
        assert_eq!(details.calories, 45.0);
        assert_eq!(details.protein, 0.7);
    }

    #[test]
    fn test_nutriment_accepts_number_shaped_strings() {
        let product: Value = serde_json::from_str(
            r#"{
                "product_name": "Crackers",
                "serving_size": "30 g",
                "nutriments": {
                    "energy-kcal_serving": "130",
                    "proteins_serving": "2.5",
                    "carbohydrates_serving": 20.0,
                    "fat_serving": 4.0
                }
            }"#,
        )
        .unwrap();

        let details = map_details(&product);
        assert_eq!(details.calories, 130.0);
        assert_eq!(details.protein, 2.5);
    }

    #[test]
    fn test_map_details_with_no_nutriments_is_zeroed() {
        let product: Value = serde_json::from_str(r#"{"product_name": "Mystery"}"#).unwrap();

        let details = map_details(&product);
        assert_eq!(details.portion, "100 g");
        assert_eq!(details.calories, 0.0);
        assert_eq!(details.fats, 0.0);
    }
}
