//! Cached snapshots of remote collections.
//!
//! Every cache write in the application goes through [`Snapshots`]: the
//! cache is only ever filled from a successful authoritative read
//! ([`Snapshots::read_through`]) or after a successful remote mutation
//! ([`Snapshots::write_through`]).

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::integration::cache::Key;

#[async_trait]
pub trait SnapshotStore {
    async fn load(&self, key: &Key<'_>) -> Option<String>;

    async fn store(&self, key: &Key<'_>, value: String);
}

pub type Store = Arc<dyn SnapshotStore + Send + Sync>;

#[derive(Clone)]
pub struct Snapshots {
    store: Store,
}

impl Snapshots {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Cached value for first paint, if any.
    pub async fn peek<T: DeserializeOwned>(&self, key: Key<'_>) -> Option<T> {
        let raw = self.store.load(&key).await?;

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                error!("Discarding malformed snapshot '{key}': {e:?}");
                None
            }
        }
    }

    /// Overwrites the snapshot with an authoritative value.
    pub async fn put<T: Serialize>(&self, key: Key<'_>, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.store.store(&key, raw).await,
            Err(e) => error!("Could not serialize snapshot '{key}': {e:?}"),
        }
    }

    /// Runs the authoritative fetch and replaces the snapshot with its
    /// result. A failed fetch leaves the previous snapshot untouched.
    pub async fn read_through<T, E, F, Fut>(&self, key: Key<'_>, fetch: F) -> Result<T, E>
    where
        T: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let fresh = fetch().await?;
        debug!("Reconciled snapshot '{key}'");
        self.put(key, &fresh).await;
        Ok(fresh)
    }

    /// Applies a remote mutation and, once it succeeded, folds its outcome
    /// into the cached snapshot.
    pub async fn write_through<T, R, E, Fut>(
        &self,
        key: Key<'_>,
        mutation: Fut,
        fold: impl FnOnce(Option<T>, &R) -> T,
    ) -> Result<R, E>
    where
        T: Serialize + DeserializeOwned,
        Fut: Future<Output = Result<R, E>>,
    {
        let outcome = mutation.await?;

        let current = self.peek::<T>(key.clone()).await;
        let next = fold(current, &outcome);
        self.put(key, &next).await;

        Ok(outcome)
    }
}
