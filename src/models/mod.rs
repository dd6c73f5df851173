mod day_entry;
mod food_item;
mod meal_entry;
mod user;

pub use day_entry::DayEntry;
pub use food_item::{FoodItem, MacroTotals};
pub use meal_entry::MealEntry;
pub use user::User;
