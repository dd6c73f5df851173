use serde::{Deserialize, Serialize};
use std::fmt;

/// One food in a meal's food list, with nutrition figures for the chosen
/// portion. Stored verbatim inside the meal row; the store never looks
/// inside it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoodItem {
    pub name: String,
    pub portion: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl FoodItem {
    pub fn new(
        name: impl Into<String>,
        portion: impl Into<String>,
        calories: f64,
        protein: f64,
        carbs: f64,
        fats: f64,
    ) -> Self {
        Self {
            name: name.into(),
            portion: portion.into(),
            calories,
            protein,
            carbs,
            fats,
        }
    }
}

impl fmt::Display for FoodItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {} kcal, {}g protein, {}g carbs, {}g fat",
            self.name, self.portion, self.calories, self.protein, self.carbs, self.fats
        )
    }
}

/// Summed nutrition over a food list, the figure the day view shows under
/// a meal.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl MacroTotals {
    pub fn of(foods: &[FoodItem]) -> Self {
        foods.iter().fold(Self::default(), |mut totals, food| {
            totals.calories += food.calories;
            totals.protein += food.protein;
            totals.carbs += food.carbs;
            totals.fats += food.fats;
            totals
        })
    }
}

impl fmt::Display for MacroTotals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} kcal, {}g protein, {}g carbs, {}g fat",
            self.calories, self.protein, self.carbs, self.fats
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_food_item_new() {
        let food = FoodItem::new("Banana", "1 medium", 105.0, 1.3, 27.0, 0.4);
        assert_eq!(food.name, "Banana");
        assert_eq!(food.portion, "1 medium");
        assert_eq!(food.calories, 105.0);
    }

    #[test]
    fn test_food_item_display() {
        let food = FoodItem::new("Oats", "50 g", 194.5, 8.4, 33.0, 3.4);
        assert_eq!(
            format!("{}", food),
            "Oats (50 g): 194.5 kcal, 8.4g protein, 33g carbs, 3.4g fat"
        );
    }

    #[test]
    fn test_food_item_json_roundtrip() {
        let food = FoodItem::new("Banana", "1 medium", 105.0, 1.3, 27.0, 0.4);
        let json = serde_json::to_string(&food).unwrap();
        let parsed: FoodItem = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, food);
    }

    #[test]
    fn test_totals_sum_every_field() {
        // Quarter-gram figures sum exactly in f64, so plain equality holds.
        let foods = vec![
            FoodItem::new("Banana", "1 medium", 105.0, 1.25, 27.0, 0.5),
            FoodItem::new("Peanut butter", "2 tbsp", 188.0, 8.0, 6.0, 16.0),
        ];
        let totals = MacroTotals::of(&foods);
        assert_eq!(totals.calories, 293.0);
        assert_eq!(totals.protein, 9.25);
        assert_eq!(totals.carbs, 33.0);
        assert_eq!(totals.fats, 16.5);
    }

    #[test]
    fn test_totals_of_empty_list_are_zero() {
        let totals = MacroTotals::of(&[]);
        assert_eq!(totals, MacroTotals::default());
    }
}
