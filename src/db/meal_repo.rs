use chrono::{DateTime, TimeZone, Utc};
use sqlx::SqlitePool;

use crate::dates;
use crate::db::listener::{spawn_watch, Listener};
use crate::db::{millis_to_utc, Collection, Store};
use crate::error::StoreError;
use crate::models::{FoodItem, MealEntry};

/// Access to the `meals` collection: logged meals addressed by an
/// eaten-at instant, soft-deleted rather than removed.
pub struct MealRepository {
    store: Store,
}

// Row types for database queries
#[derive(sqlx::FromRow)]
struct MealRow {
    id: String,
    meal: String,
    name: String,
    eaten_at: i64,
    uid: String,
    created_at: i64,
    updated_at: Option<i64>,
    deleted: bool,
}

impl MealRow {
    fn into_entry(self) -> MealEntry {
        MealEntry {
            id: self.id,
            foods: serde_json::from_str(&self.meal).unwrap_or_default(),
            name: self.name,
            eaten_at: millis_to_utc(self.eaten_at),
            uid: self.uid,
            created_at: millis_to_utc(self.created_at),
            updated_at: self.updated_at.map(millis_to_utc),
            deleted: self.deleted,
        }
    }
}

/// The empty name falls back to "Untitled" in the stored row; the id keeps
/// whatever the caller passed.
fn stored_name(name: &str) -> &str {
    if name.is_empty() {
        "Untitled"
    } else {
        name
    }
}

async fn fetch_window(
    pool: &SqlitePool,
    uid: &str,
    start_ms: i64,
    end_ms: i64,
) -> Result<Vec<MealEntry>, StoreError> {
    let rows: Vec<MealRow> = sqlx::query_as(
        "SELECT id, meal, name, eaten_at, uid, created_at, updated_at, deleted \
         FROM meals WHERE uid = ? AND eaten_at >= ? AND eaten_at < ? AND deleted = 0 \
         ORDER BY eaten_at",
    )
    .bind(uid)
    .bind(start_ms)
    .bind(end_ms)
    .fetch_all(pool)
    .await
    .map_err(StoreError::Query)?;

    Ok(rows.into_iter().map(MealRow::into_entry).collect())
}

impl MealRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Stores a new meal. The food list is kept in order; an empty `name`
    /// is stored as "Untitled". Two creates for the same `(uid, name)` in
    /// the same millisecond mint the same id, and the later write replaces
    /// the row wholesale instead of erroring.
    pub async fn create<Tz: TimeZone>(
        &self,
        foods: &[FoodItem],
        name: &str,
        uid: &str,
        eaten_at: &DateTime<Tz>,
    ) -> Result<MealEntry, StoreError> {
        let now = millis_to_utc(Utc::now().timestamp_millis());
        let eaten = millis_to_utc(eaten_at.timestamp_millis());
        let id = format!("{}-{}-{}", uid, now.timestamp_millis(), name);
        let meal_json = serde_json::to_string(foods).unwrap_or_else(|_| "[]".to_string());

        sqlx::query(
            "INSERT OR REPLACE INTO meals (id, meal, name, eaten_at, uid, created_at, updated_at, deleted) \
             VALUES (?, ?, ?, ?, ?, ?, NULL, 0)",
        )
        .bind(&id)
        .bind(&meal_json)
        .bind(stored_name(name))
        .bind(eaten.timestamp_millis())
        .bind(uid)
        .bind(now.timestamp_millis())
        .execute(self.store.pool())
        .await
        .map_err(StoreError::Write)?;

        self.store.notify(Collection::Meals);

        Ok(MealEntry {
            id,
            foods: foods.to_vec(),
            name: stored_name(name).to_string(),
            eaten_at: eaten,
            uid: uid.to_string(),
            created_at: now,
            updated_at: None,
            deleted: false,
        })
    }

    /// Full overwrite of the named meal: food list, name (defaulted),
    /// eaten-at and owner are all replaced, `deleted` is forced back to
    /// false and `updated_at` refreshed.
    pub async fn update<Tz: TimeZone>(
        &self,
        foods: &[FoodItem],
        name: &str,
        uid: &str,
        eaten_at: &DateTime<Tz>,
        id: &str,
    ) -> Result<(), StoreError> {
        let meal_json = serde_json::to_string(foods).unwrap_or_else(|_| "[]".to_string());

        let result = sqlx::query(
            "UPDATE meals SET meal = ?, name = ?, eaten_at = ?, uid = ?, updated_at = ?, \
             deleted = 0 WHERE id = ?",
        )
        .bind(&meal_json)
        .bind(stored_name(name))
        .bind(eaten_at.timestamp_millis())
        .bind(uid)
        .bind(Utc::now().timestamp_millis())
        .bind(id)
        .execute(self.store.pool())
        .await
        .map_err(StoreError::Write)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }

        self.store.notify(Collection::Meals);
        Ok(())
    }

    /// Soft delete: flips the flag and refreshes `updated_at`; the food
    /// list and every other column stay as they were. Deleting an already
    /// deleted meal only refreshes the timestamp again.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE meals SET deleted = 1, updated_at = ? WHERE id = ?")
            .bind(Utc::now().timestamp_millis())
            .bind(id)
            .execute(self.store.pool())
            .await
            .map_err(StoreError::Write)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }

        self.store.notify(Collection::Meals);
        Ok(())
    }

    /// Live meals eaten on `date`'s calendar day, half-open
    /// `[day_start, day_end)`.
    pub async fn find_by_date<Tz: TimeZone>(
        &self,
        date: &DateTime<Tz>,
        uid: &str,
    ) -> Result<Vec<MealEntry>, StoreError> {
        fetch_window(
            self.store.pool(),
            uid,
            dates::day_start(date).timestamp_millis(),
            dates::day_end(date).timestamp_millis(),
        )
        .await
    }

    /// Live meals eaten in the ISO week containing `date`, Monday start,
    /// exclusive end.
    pub async fn find_by_week<Tz: TimeZone>(
        &self,
        date: &DateTime<Tz>,
        uid: &str,
    ) -> Result<Vec<MealEntry>, StoreError> {
        fetch_window(
            self.store.pool(),
            uid,
            dates::iso_week_start(date).timestamp_millis(),
            dates::iso_week_end(date).timestamp_millis(),
        )
        .await
    }

    /// Live meals with `start <= eaten_at <= end`, inclusive on both
    /// ends, unlike the day and week windows.
    pub async fn find_by_range<Tz: TimeZone>(
        &self,
        start: &DateTime<Tz>,
        end: &DateTime<Tz>,
        uid: &str,
    ) -> Result<Vec<MealEntry>, StoreError> {
        let rows: Vec<MealRow> = sqlx::query_as(
            "SELECT id, meal, name, eaten_at, uid, created_at, updated_at, deleted \
             FROM meals WHERE uid = ? AND eaten_at >= ? AND eaten_at <= ? AND deleted = 0 \
             ORDER BY eaten_at",
        )
        .bind(uid)
        .bind(start.timestamp_millis())
        .bind(end.timestamp_millis())
        .fetch_all(self.store.pool())
        .await
        .map_err(StoreError::Query)?;

        Ok(rows.into_iter().map(MealRow::into_entry).collect())
    }

    /// Live subscription to the [`find_by_date`](Self::find_by_date)
    /// query, seeded with its current result. Every committed write to the
    /// meals collection re-runs the query and replaces the snapshot; a
    /// write landing while the seed is read shows up as the first refresh.
    pub async fn watch_by_date<Tz: TimeZone>(
        &self,
        date: &DateTime<Tz>,
        uid: &str,
    ) -> Result<Listener<Vec<MealEntry>>, StoreError> {
        let start_ms = dates::day_start(date).timestamp_millis();
        let end_ms = dates::day_end(date).timestamp_millis();
        let uid = uid.to_string();

        spawn_watch(&self.store, Collection::Meals, move |pool| {
            let uid = uid.clone();
            async move { fetch_window(&pool, &uid, start_ms, end_ms).await }
        })
        .await
    }
}
