use chrono::{DateTime, TimeZone, Utc};
use sqlx::SqlitePool;

use crate::dates;
use crate::db::listener::{spawn_watch, Listener};
use crate::db::{millis_to_utc, Collection, Store};
use crate::error::StoreError;
use crate::models::DayEntry;

/// Access to the `days` collection: one goal/weight record per user per
/// calendar day, addressed by the day's local midnight.
pub struct DayRepository {
    store: Store,
}

// Row types for database queries
#[derive(sqlx::FromRow)]
struct DayRow {
    id: String,
    date: i64,
    goal_calories: Option<i64>,
    weight: Option<f64>,
    uid: String,
    created_at: i64,
    updated_at: Option<i64>,
    deleted: bool,
}

impl DayRow {
    fn into_entry(self) -> DayEntry {
        DayEntry {
            id: self.id,
            date: millis_to_utc(self.date),
            goal_calories: self.goal_calories,
            weight: self.weight,
            uid: self.uid,
            created_at: millis_to_utc(self.created_at),
            updated_at: self.updated_at.map(millis_to_utc),
            deleted: self.deleted,
        }
    }
}

async fn fetch_document(
    pool: &SqlitePool,
    uid: &str,
    date_ms: i64,
) -> Result<Option<DayEntry>, StoreError> {
    let row: Option<DayRow> = sqlx::query_as(
        "SELECT id, date, goal_calories, weight, uid, created_at, updated_at, deleted \
         FROM days WHERE uid = ? AND date = ? AND deleted = 0 ORDER BY id LIMIT 1",
    )
    .bind(uid)
    .bind(date_ms)
    .fetch_optional(pool)
    .await
    .map_err(StoreError::Query)?;

    Ok(row.map(DayRow::into_entry))
}

impl DayRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Creates a fresh entry carrying the calorie goal for `date`'s day.
    ///
    /// There is no existence check first: two concurrent creates for the
    /// same `(uid, day)` mint distinct timestamp-suffixed ids and both
    /// rows stay live, with reads resolving to the first id. Creates that
    /// land in the same millisecond mint the same id, and the later write
    /// replaces the row wholesale instead of erroring.
    pub async fn create_goal<Tz: TimeZone>(
        &self,
        date: &DateTime<Tz>,
        goal_calories: i64,
        uid: &str,
    ) -> Result<DayEntry, StoreError> {
        self.create(date, Some(goal_calories), None, uid).await
    }

    /// Creates a fresh entry carrying the body weight for `date`'s day.
    /// Same no-precheck semantics as [`create_goal`](Self::create_goal).
    pub async fn create_weight<Tz: TimeZone>(
        &self,
        date: &DateTime<Tz>,
        weight: f64,
        uid: &str,
    ) -> Result<DayEntry, StoreError> {
        self.create(date, None, Some(weight), uid).await
    }

    async fn create<Tz: TimeZone>(
        &self,
        date: &DateTime<Tz>,
        goal_calories: Option<i64>,
        weight: Option<f64>,
        uid: &str,
    ) -> Result<DayEntry, StoreError> {
        let start = dates::day_start(date);
        let now = millis_to_utc(Utc::now().timestamp_millis());
        let id = format!(
            "{}-{}-{}",
            uid,
            start.date_naive().format("%Y-%m-%d"),
            now.timestamp_millis()
        );

        sqlx::query(
            "INSERT OR REPLACE INTO days (id, date, goal_calories, weight, uid, created_at, updated_at, deleted) \
             VALUES (?, ?, ?, ?, ?, ?, NULL, 0)",
        )
        .bind(&id)
        .bind(start.timestamp_millis())
        .bind(goal_calories)
        .bind(weight)
        .bind(uid)
        .bind(now.timestamp_millis())
        .execute(self.store.pool())
        .await
        .map_err(StoreError::Write)?;

        self.store.notify(Collection::Days);

        Ok(DayEntry {
            id,
            date: start.with_timezone(&Utc),
            goal_calories,
            weight,
            uid: uid.to_string(),
            created_at: now,
            updated_at: None,
            deleted: false,
        })
    }

    /// Rewrites the goal on the named entry. Partial update: `weight` and
    /// `created_at` keep their stored values; `deleted` is forced back to
    /// false.
    pub async fn update_goal<Tz: TimeZone>(
        &self,
        date: &DateTime<Tz>,
        goal_calories: i64,
        uid: &str,
        id: &str,
    ) -> Result<(), StoreError> {
        let start = dates::day_start(date);

        let result = sqlx::query(
            "UPDATE days SET date = ?, goal_calories = ?, uid = ?, updated_at = ?, deleted = 0 \
             WHERE id = ?",
        )
        .bind(start.timestamp_millis())
        .bind(goal_calories)
        .bind(uid)
        .bind(Utc::now().timestamp_millis())
        .bind(id)
        .execute(self.store.pool())
        .await
        .map_err(StoreError::Write)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }

        self.store.notify(Collection::Days);
        Ok(())
    }

    /// Rewrites the weight on the named entry; `goal_calories` keeps its
    /// stored value.
    pub async fn update_weight<Tz: TimeZone>(
        &self,
        date: &DateTime<Tz>,
        weight: f64,
        uid: &str,
        id: &str,
    ) -> Result<(), StoreError> {
        let start = dates::day_start(date);

        let result = sqlx::query(
            "UPDATE days SET date = ?, weight = ?, uid = ?, updated_at = ?, deleted = 0 \
             WHERE id = ?",
        )
        .bind(start.timestamp_millis())
        .bind(weight)
        .bind(uid)
        .bind(Utc::now().timestamp_millis())
        .bind(id)
        .execute(self.store.pool())
        .await
        .map_err(StoreError::Write)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }

        self.store.notify(Collection::Days);
        Ok(())
    }

    /// The single live entry for `date`'s calendar day, or `None`. Zero
    /// rows is never an error.
    pub async fn find_document<Tz: TimeZone>(
        &self,
        date: &DateTime<Tz>,
        uid: &str,
    ) -> Result<Option<DayEntry>, StoreError> {
        let date_ms = dates::day_start(date).timestamp_millis();
        fetch_document(self.store.pool(), uid, date_ms).await
    }

    /// Live entries whose day falls in the ISO week containing `date`,
    /// Monday start, exclusive end.
    pub async fn find_by_week<Tz: TimeZone>(
        &self,
        date: &DateTime<Tz>,
        uid: &str,
    ) -> Result<Vec<DayEntry>, StoreError> {
        self.find_in_window(
            dates::iso_week_start(date).timestamp_millis(),
            dates::iso_week_end(date).timestamp_millis(),
            uid,
        )
        .await
    }

    /// Live entries whose day falls in the calendar month containing
    /// `date`, exclusive end.
    pub async fn find_by_month<Tz: TimeZone>(
        &self,
        date: &DateTime<Tz>,
        uid: &str,
    ) -> Result<Vec<DayEntry>, StoreError> {
        self.find_in_window(
            dates::month_start(date).timestamp_millis(),
            dates::month_end(date).timestamp_millis(),
            uid,
        )
        .await
    }

    async fn find_in_window(
        &self,
        start_ms: i64,
        end_ms: i64,
        uid: &str,
    ) -> Result<Vec<DayEntry>, StoreError> {
        let rows: Vec<DayRow> = sqlx::query_as(
            "SELECT id, date, goal_calories, weight, uid, created_at, updated_at, deleted \
             FROM days WHERE uid = ? AND date >= ? AND date < ? AND deleted = 0 ORDER BY date",
        )
        .bind(uid)
        .bind(start_ms)
        .bind(end_ms)
        .fetch_all(self.store.pool())
        .await
        .map_err(StoreError::Query)?;

        Ok(rows.into_iter().map(DayRow::into_entry).collect())
    }

    /// Live subscription to the [`find_document`](Self::find_document)
    /// query, seeded with its current result. Every committed write to the
    /// days collection re-runs the query and replaces the snapshot; a write
    /// landing while the seed is read shows up as the first refresh.
    pub async fn watch_document<Tz: TimeZone>(
        &self,
        date: &DateTime<Tz>,
        uid: &str,
    ) -> Result<Listener<Option<DayEntry>>, StoreError> {
        let date_ms = dates::day_start(date).timestamp_millis();
        let uid = uid.to_string();

        spawn_watch(&self.store, Collection::Days, move |pool| {
            let uid = uid.clone();
            async move { fetch_document(&pool, &uid, date_ms).await }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    struct TestContext {
        store: Store,
        repo: DayRepository,
        _temp_dir: TempDir, // Keep alive for duration of test
    }

    async fn setup_repo() -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(&temp_dir.path().join("test.db")).await.unwrap();
        TestContext {
            repo: DayRepository::new(store.clone()),
            store,
            _temp_dir: temp_dir,
        }
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[tokio::test]
    async fn test_create_goal_then_find() {
        let ctx = setup_repo().await;

        ctx.repo
            .create_goal(&utc(2024, 3, 5, 10, 0, 0), 1800, "u1")
            .await
            .unwrap();

        // Any instant in the same day resolves to the same entry.
        let found = ctx
            .repo
            .find_document(&utc(2024, 3, 5, 18, 45, 0), "u1")
            .await
            .unwrap()
            .unwrap();

        assert!(found.id.starts_with("u1-2024-03-05-"));
        assert_eq!(found.goal_calories, Some(1800));
        assert_eq!(found.weight, None);
        assert_eq!(found.date, utc(2024, 3, 5, 0, 0, 0));
        assert!(!found.deleted);
        assert!(found.updated_at.is_none());
    }

    #[tokio::test]
    async fn test_find_document_missing_is_none() {
        let ctx = setup_repo().await;

        let found = ctx
            .repo
            .find_document(&utc(2024, 3, 5, 12, 0, 0), "u1")
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_find_document_ignores_other_owners() {
        let ctx = setup_repo().await;
        let date = utc(2024, 3, 5, 9, 0, 0);

        ctx.repo.create_goal(&date, 1800, "u1").await.unwrap();

        let found = ctx.repo.find_document(&date, "u2").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_update_goal_preserves_weight() {
        let ctx = setup_repo().await;
        let date = utc(2024, 3, 5, 8, 0, 0);

        let created = ctx.repo.create_weight(&date, 82.5, "u1").await.unwrap();
        ctx.repo
            .update_goal(&date, 1900, "u1", &created.id)
            .await
            .unwrap();

        let found = ctx.repo.find_document(&date, "u1").await.unwrap().unwrap();
        assert_eq!(found.goal_calories, Some(1900));
        assert_eq!(found.weight, Some(82.5));
        assert!(found.updated_at.is_some());
        assert_eq!(found.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_weight_preserves_goal() {
        let ctx = setup_repo().await;
        let date = utc(2024, 3, 5, 8, 0, 0);

        let created = ctx.repo.create_goal(&date, 2200, "u1").await.unwrap();
        ctx.repo
            .update_weight(&date, 79.0, "u1", &created.id)
            .await
            .unwrap();

        let found = ctx.repo.find_document(&date, "u1").await.unwrap().unwrap();
        assert_eq!(found.goal_calories, Some(2200));
        assert_eq!(found.weight, Some(79.0));
    }

    #[tokio::test]
    async fn test_update_missing_id_is_not_found() {
        let ctx = setup_repo().await;

        let err = ctx
            .repo
            .update_goal(&utc(2024, 3, 5, 8, 0, 0), 1800, "u1", "u1-2024-03-05-0")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "u1-2024-03-05-0"));
    }

    #[tokio::test]
    async fn test_duplicate_creates_leave_two_live_rows() {
        let ctx = setup_repo().await;
        let date = utc(2024, 3, 5, 8, 0, 0);

        ctx.repo.create_goal(&date, 1800, "u1").await.unwrap();
        // Distinct creation millis keep the ids distinct.
        tokio::time::sleep(Duration::from_millis(2)).await;
        ctx.repo.create_goal(&date, 2000, "u1").await.unwrap();

        let (live,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM days WHERE uid = 'u1' AND deleted = 0")
                .fetch_one(ctx.store.pool())
                .await
                .unwrap();
        assert_eq!(live, 2);

        // Lookups still resolve: first id wins.
        let found = ctx.repo.find_document(&date, "u1").await.unwrap().unwrap();
        assert_eq!(found.goal_calories, Some(1800));
    }

    #[tokio::test]
    async fn test_same_millisecond_create_replaces_the_row() {
        let ctx = setup_repo().await;
        let date = utc(2024, 3, 5, 8, 0, 0);

        // Back-to-back creates normally land in the same millisecond and
        // mint the same id. Neither write may error; once the ids collide
        // the later row must have replaced the earlier one wholesale.
        for _ in 0..50 {
            let first = ctx.repo.create_goal(&date, 1800, "u1").await.unwrap();
            let second = ctx.repo.create_goal(&date, 2000, "u1").await.unwrap();
            if first.id == second.id {
                let rows: Vec<(Option<i64>,)> =
                    sqlx::query_as("SELECT goal_calories FROM days WHERE id = ?")
                        .bind(&second.id)
                        .fetch_all(ctx.store.pool())
                        .await
                        .unwrap();
                assert_eq!(rows, vec![(Some(2000),)]);
                return;
            }
        }
    }

    #[tokio::test]
    async fn test_find_by_week_empty_is_empty_vec() {
        let ctx = setup_repo().await;

        let found = ctx
            .repo
            .find_by_week(&utc(2024, 3, 5, 12, 0, 0), "u1")
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_week_excludes_the_end_instant() {
        let ctx = setup_repo().await;

        // ISO week of 2024-03-05 runs Mon 03-04 through Sun 03-10;
        // 03-11 midnight is the exclusive end.
        ctx.repo
            .create_goal(&utc(2024, 3, 5, 10, 0, 0), 1800, "u1")
            .await
            .unwrap();
        ctx.repo
            .create_goal(&utc(2024, 3, 11, 0, 0, 0), 2000, "u1")
            .await
            .unwrap();

        let found = ctx
            .repo
            .find_by_week(&utc(2024, 3, 5, 12, 0, 0), "u1")
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].goal_calories, Some(1800));
    }

    #[tokio::test]
    async fn test_find_by_month_stays_inside_the_month() {
        let ctx = setup_repo().await;

        ctx.repo
            .create_goal(&utc(2024, 2, 29, 10, 0, 0), 1700, "u1")
            .await
            .unwrap();
        ctx.repo
            .create_goal(&utc(2024, 3, 1, 0, 0, 0), 1900, "u1")
            .await
            .unwrap();

        let found = ctx
            .repo
            .find_by_month(&utc(2024, 2, 10, 12, 0, 0), "u1")
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].goal_calories, Some(1700));
    }

    #[tokio::test]
    async fn test_soft_deleted_day_is_invisible() {
        let ctx = setup_repo().await;
        let date = utc(2024, 3, 5, 8, 0, 0);

        let created = ctx.repo.create_goal(&date, 1800, "u1").await.unwrap();

        // No public delete path exists for day entries; flip the flag
        // directly to check the read filter.
        sqlx::query("UPDATE days SET deleted = 1 WHERE id = ?")
            .bind(&created.id)
            .execute(ctx.store.pool())
            .await
            .unwrap();

        let found = ctx.repo.find_document(&date, "u1").await.unwrap();
        assert!(found.is_none());
        let week = ctx.repo.find_by_week(&date, "u1").await.unwrap();
        assert!(week.is_empty());
    }

    #[tokio::test]
    async fn test_watch_document_sees_the_create() {
        let ctx = setup_repo().await;
        let date = utc(2024, 3, 5, 8, 0, 0);

        let mut listener = ctx.repo.watch_document(&date, "u1").await.unwrap();
        assert!(listener.current().is_none());

        ctx.repo.create_goal(&date, 1800, "u1").await.unwrap();

        let refreshed = tokio::time::timeout(Duration::from_secs(2), listener.changed())
            .await
            .expect("snapshot never refreshed");
        assert!(refreshed);

        let snapshot = listener.current().unwrap();
        assert_eq!(snapshot.goal_calories, Some(1800));
    }
}
