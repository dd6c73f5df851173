use sqlx::SqlitePool;
use std::future::Future;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::db::{Collection, Store};
use crate::error::StoreError;

/// A live subscription to one query: holds the latest snapshot and replaces
/// it wholesale whenever a write touches the watched collection.
///
/// Each listener is independent; several may watch the same query. Dropping
/// the handle or calling [`unsubscribe`](Listener::unsubscribe) stops the
/// refresh task. There is no other cancellation path.
pub struct Listener<T> {
    rx: watch::Receiver<T>,
    task: JoinHandle<()>,
}

impl<T> Listener<T> {
    /// The latest snapshot. Before any change has fired this is the seed
    /// value the subscription was opened with.
    pub fn current(&self) -> T
    where
        T: Clone,
    {
        self.rx.borrow().clone()
    }

    /// Waits until the snapshot is replaced. Returns `false` once no
    /// further updates can arrive (the store went away).
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Stops the subscription. Dropping the handle has the same effect.
    pub fn unsubscribe(self) {}
}

impl<T> Drop for Listener<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Starts a refresh task that re-runs `query` whenever `collection`
/// changes and publishes the result. `query` also computes the seed
/// snapshot, and the bus subscription is registered before that first
/// read runs: a write committing while the seed is in flight queues its
/// event and replays as the first refresh instead of being dropped.
/// Failed refreshes keep the previous snapshot; there is no retry beyond
/// the next change event.
pub(crate) async fn spawn_watch<T, F, Fut>(
    store: &Store,
    collection: Collection,
    query: F,
) -> Result<Listener<T>, StoreError>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(SqlitePool) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, StoreError>> + Send + 'static,
{
    let mut events = store.subscribe();
    let pool = store.pool().clone();

    let seed = query(pool.clone()).await?;
    let (tx, rx) = watch::channel(seed);

    let task = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(touched) if touched == collection => {}
                Ok(_) => continue,
                // Missed events collapse into one refresh; the query reads
                // current state anyway.
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => break,
            }
            match query(pool.clone()).await {
                Ok(snapshot) => {
                    if tx.send(snapshot).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    tracing::warn!("live query refresh failed: {err}");
                }
            }
        }
    });

    Ok(Listener { rx, task })
}
