use crate::db::{Collection, Store};
use crate::error::StoreError;
use crate::models::User;

/// Access to the `users` collection. One operation: the whole record is
/// upserted keyed by `uid`, no read-before-write, no merge.
pub struct UserRepository {
    store: Store,
}

impl UserRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn save(&self, uid: &str, email: &str) -> Result<User, StoreError> {
        sqlx::query(
            "INSERT INTO users (uid, email) VALUES (?, ?) \
             ON CONFLICT(uid) DO UPDATE SET email = excluded.email",
        )
        .bind(uid)
        .bind(email)
        .execute(self.store.pool())
        .await
        .map_err(StoreError::Write)?;

        self.store.notify(Collection::Users);
        Ok(User::new(uid, email))
    }
}
