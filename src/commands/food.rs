use clap::{Args, Subcommand};

use crate::api::{FoodSearcher, Provider};
use crate::config::Config;
use crate::models::FoodItem;

#[derive(Args)]
pub struct FoodCommand {
    #[command(subcommand)]
    pub command: FoodSubcommand,
}

#[derive(Subcommand)]
pub enum FoodSubcommand {
    /// Search a food database
    Search {
        /// Search text
        query: String,

        /// Which database to search (usda, ofd)
        #[arg(long, short, default_value = "ofd")]
        provider: String,

        /// Search the French Open Food Facts catalog instead of the US one
        #[arg(long)]
        france: bool,

        /// How many result pages to fetch
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Show nutrition details for a search result
    Details {
        /// Provider the result came from (usda, ofd)
        provider: String,

        /// Result id: a USDA fdcId or an Open Food Facts barcode
        id: String,
    },
}

impl FoodCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            FoodSubcommand::Search {
                query,
                provider,
                france,
                pages,
            } => {
                if query.trim().is_empty() {
                    return Err("Search text is empty.".into());
                }
                let provider: Provider = provider.parse().map_err(|e: String| e)?;
                let searcher = FoodSearcher::new(config.usda_api_key.clone());

                let mut results = Vec::new();
                for page in 0..*pages {
                    let mut batch = searcher.search(provider, query, *france, page).await?;
                    if batch.is_empty() {
                        break;
                    }
                    results.append(&mut batch);
                }

                if results.is_empty() {
                    println!("No items found");
                    return Ok(());
                }

                for (index, result) in results.iter().enumerate() {
                    println!(
                        "{:3}. [{}] {}  ({})",
                        index + 1,
                        result.api,
                        result.description,
                        result.id
                    );
                }
                Ok(())
            }
            FoodSubcommand::Details { provider, id } => {
                let provider: Provider = provider.parse().map_err(|e: String| e)?;
                let searcher = FoodSearcher::new(config.usda_api_key.clone());
                let details = searcher.get_details(provider, id).await?;

                let food = FoodItem::from(details);
                println!("{}", food);
                println!();
                println!(
                    "Log it with: mealtrack meal log --food \"{}:{}:{}:{}:{}:{}\"",
                    food.name, food.portion, food.calories, food.protein, food.carbs, food.fats
                );
                Ok(())
            }
        }
    }
}
