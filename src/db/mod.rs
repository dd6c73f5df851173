mod day_repo;
mod listener;
mod meal_repo;
mod user_repo;

pub use day_repo::DayRepository;
pub use listener::Listener;
pub use meal_repo::MealRepository;
pub use user_repo::UserRepository;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tokio::sync::broadcast;

use crate::error::StoreError;

/// The collections a write can touch. Carried on the change bus so live
/// queries know when to refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Days,
    Meals,
    Users,
}

/// Shared storage handle: one connection pool plus one change bus,
/// constructed once and cloned into every repository. Tests open their own
/// store against a temp file.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
    changes: broadcast::Sender<Collection>,
}

impl Store {
    /// Opens (creating if missing) the database at `db_path` and runs
    /// migrations.
    pub async fn open(db_path: &Path) -> Result<Self, StoreError> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create database directory");
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        let options = SqliteConnectOptions::from_str(&db_url)
            .map_err(StoreError::Open)?
            .foreign_keys(true)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(StoreError::Open)?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        tracing::debug!("opened store at {}", db_path.display());

        let (changes, _) = broadcast::channel(64);
        Ok(Self { pool, changes })
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Announces a committed write. A send error only means nobody is
    /// listening right now.
    pub(crate) fn notify(&self, collection: Collection) {
        let _ = self.changes.send(collection);
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<Collection> {
        self.changes.subscribe()
    }
}

/// Instants are persisted as epoch milliseconds so range predicates compare
/// numerically. A value that does not fit a timestamp maps to now, the same
/// fallback the JSON decoding paths use.
pub(crate) fn millis_to_utc(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_else(Utc::now)
}
