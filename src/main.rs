use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mealtrack::commands::{
    ConfigCommand, DayCommand, DayRepos, FoodCommand, GoalCommand, HistoryCommand, HistoryRepos,
    MealCommand, UserCommand, WeightCommand,
};
use mealtrack::config::Config;
use mealtrack::db::{DayRepository, MealRepository, Store, UserRepository};

#[derive(Parser)]
#[command(name = "mealtrack")]
#[command(version)]
#[command(about = "A calorie and meal tracking CLI application", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Set daily calorie goals
    Goal(GoalCommand),

    /// Record body weight
    Weight(WeightCommand),

    /// Show or watch a single day
    Day(DayCommand),

    /// Log and list meals
    Meal(MealCommand),

    /// Weekly and monthly history
    History(HistoryCommand),

    /// Search the food databases
    Food(FoodCommand),

    /// Manage the account record
    User(UserCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mealtrack=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Goal(cmd)) => {
            let store = Store::open(&config.database_path).await?;
            let days = DayRepository::new(store);
            cmd.run(&days, &config).await?;
        }
        Some(Commands::Weight(cmd)) => {
            let store = Store::open(&config.database_path).await?;
            let days = DayRepository::new(store);
            cmd.run(&days, &config).await?;
        }
        Some(Commands::Day(cmd)) => {
            let store = Store::open(&config.database_path).await?;
            let days = DayRepository::new(store.clone());
            let meals = MealRepository::new(store);
            cmd.run(
                DayRepos {
                    days: &days,
                    meals: &meals,
                },
                &config,
            )
            .await?;
        }
        Some(Commands::Meal(cmd)) => {
            let store = Store::open(&config.database_path).await?;
            let meals = MealRepository::new(store);
            cmd.run(&meals, &config).await?;
        }
        Some(Commands::History(cmd)) => {
            let store = Store::open(&config.database_path).await?;
            let days = DayRepository::new(store.clone());
            let meals = MealRepository::new(store);
            cmd.run(
                HistoryRepos {
                    days: &days,
                    meals: &meals,
                },
                &config,
            )
            .await?;
        }
        Some(Commands::Food(cmd)) => {
            cmd.run(&config).await?;
        }
        Some(Commands::User(cmd)) => {
            let store = Store::open(&config.database_path).await?;
            let users = UserRepository::new(store);
            cmd.run(&users, &config).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
