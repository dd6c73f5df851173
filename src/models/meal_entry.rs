use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::food_item::{FoodItem, MacroTotals};

/// One logged meal: an ordered food list eaten at a point in time.
///
/// The identifier follows `{uid}-{createdAtMillis}-{name}` with the name
/// as the caller supplied it; the stored `name` itself falls back to
/// "Untitled" when empty. Creates sharing a name and a millisecond mint
/// the same id and the later one wins. Deleted meals keep their row and
/// food list and are filtered out of every read path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealEntry {
    pub id: String,
    pub foods: Vec<FoodItem>,
    pub name: String,
    pub eaten_at: DateTime<Utc>,
    pub uid: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted: bool,
}

impl MealEntry {
    /// Summed nutrition over the food list.
    pub fn totals(&self) -> MacroTotals {
        MacroTotals::of(&self.foods)
    }
}

impl fmt::Display for MealEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} - {}", self.name, self.eaten_at.format("%Y-%m-%d %H:%M"))?;
        for food in &self.foods {
            writeln!(f, "  - {}", food)?;
        }
        write!(f, "  total: {}", self.totals())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // Fixture figures are quarter-gram values whose sums are exact in
    // f64, so the totals assertions can stay plain equality.
    fn meal() -> MealEntry {
        MealEntry {
            id: "u1-1709632800000-Breakfast".to_string(),
            foods: vec![
                FoodItem::new("Banana", "1 medium", 105.0, 1.25, 27.0, 0.5),
                FoodItem::new("Oats", "50 g", 194.5, 8.5, 33.0, 3.25),
            ],
            name: "Breakfast".to_string(),
            eaten_at: Utc.with_ymd_and_hms(2024, 3, 5, 7, 30, 0).unwrap(),
            uid: "u1".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 5, 7, 35, 0).unwrap(),
            updated_at: None,
            deleted: false,
        }
    }

    #[test]
    fn test_meal_totals() {
        let totals = meal().totals();
        assert_eq!(totals.calories, 299.5);
        assert_eq!(totals.protein, 9.75);
        assert_eq!(totals.carbs, 60.0);
        assert_eq!(totals.fats, 3.75);
    }

    #[test]
    fn test_meal_display_lists_foods() {
        let output = format!("{}", meal());
        assert!(output.contains("Breakfast - 2024-03-05 07:30"));
        assert!(output.contains("Banana"));
        assert!(output.contains("total:"));
    }

    #[test]
    fn test_meal_json_roundtrip() {
        let meal = meal();
        let json = serde_json::to_string(&meal).unwrap();
        let parsed: MealEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, meal);
    }
}
