//! `InMemoryStore` — path-addressed JSON values with change fan-out.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};
use tokio::sync::broadcast;

use clothesline_app::ports::{SharedStore, Subscription};
use clothesline_domain::error::ClotheslineError;

use crate::error::StoreError;

const DEFAULT_CAPACITY: usize = 64;

#[derive(Default)]
struct Inner {
    values: HashMap<String, Value>,
    channels: HashMap<String, broadcast::Sender<Value>>,
}

impl Inner {
    fn channel(&mut self, path: &str, capacity: usize) -> &broadcast::Sender<Value> {
        self.channels
            .entry(path.to_string())
            .or_insert_with(|| broadcast::channel(capacity).0)
    }

    fn notify(&mut self, path: &str, value: Value, capacity: usize) {
        // no receiver is fine, the value is stored anyway
        let _ = self.channel(path, capacity).send(value);
    }
}

/// Realtime store kept in process memory.
///
/// Writing `null` removes the value, and merging a `null` key removes that
/// key. Every successful `write` or `merge` is delivered to the subscribers
/// of that exact path.
pub struct InMemoryStore {
    inner: Mutex<Inner>,
    capacity: usize,
    offline: AtomicBool,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl InMemoryStore {
    /// Create a store whose subscribers may lag by up to `capacity` changes.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity: capacity.max(1),
            offline: AtomicBool::new(false),
        }
    }

    /// Make every following `write`, `merge` and `read` fail until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
        tracing::info!(offline, "store availability changed");
    }

    /// Current value at `path`, bypassing the port.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<Value> {
        self.lock().values.get(path).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self, path: &str) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Offline);
        }
        if !path.starts_with('/') || path.len() < 2 {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
        Ok(())
    }

    fn write_sync(&self, path: &str, value: Value) -> Result<(), StoreError> {
        self.check(path)?;
        let mut inner = self.lock();
        if value.is_null() {
            inner.values.remove(path);
        } else {
            inner.values.insert(path.to_string(), value.clone());
        }
        inner.notify(path, value, self.capacity);
        Ok(())
    }

    fn merge_sync(&self, path: &str, partial: Value) -> Result<(), StoreError> {
        self.check(path)?;
        let Value::Object(partial) = partial else {
            return Err(StoreError::NotAnObject(path.to_string()));
        };
        let mut inner = self.lock();
        let entry = inner
            .values
            .entry(path.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(target) = entry.as_object_mut() else {
            return Err(StoreError::NotAnObject(path.to_string()));
        };
        for (key, value) in partial {
            if value.is_null() {
                target.remove(&key);
            } else {
                target.insert(key, value);
            }
        }
        let merged = entry.clone();
        inner.notify(path, merged, self.capacity);
        Ok(())
    }

    fn read_sync(&self, path: &str) -> Result<Option<Value>, StoreError> {
        self.check(path)?;
        Ok(self.get(path))
    }
}

impl SharedStore for InMemoryStore {
    fn write(
        &self,
        path: &str,
        value: Value,
    ) -> impl Future<Output = Result<(), ClotheslineError>> + Send {
        let result = self.write_sync(path, value).map_err(ClotheslineError::from);
        async { result }
    }

    fn merge(
        &self,
        path: &str,
        partial: Value,
    ) -> impl Future<Output = Result<(), ClotheslineError>> + Send {
        let result = self.merge_sync(path, partial).map_err(ClotheslineError::from);
        async { result }
    }

    fn read(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<Option<Value>, ClotheslineError>> + Send {
        let result = self.read_sync(path).map_err(ClotheslineError::from);
        async { result }
    }

    fn subscribe(&self, path: &str) -> Subscription {
        let mut inner = self.lock();
        let receiver = inner.channel(path, self.capacity).subscribe();
        let initial = inner.values.get(path).cloned();
        Subscription::new(path, initial, receiver)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn should_read_back_written_value() {
        let store = InMemoryStore::default();
        store.write("/a/status", json!({"x": 1})).await.unwrap();
        assert_eq!(store.read("/a/status").await.unwrap(), Some(json!({"x": 1})));
    }

    #[tokio::test]
    async fn should_return_none_for_unknown_path() {
        let store = InMemoryStore::default();
        assert_eq!(store.read("/nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn should_merge_shallowly_and_keep_unrelated_keys() {
        let store = InMemoryStore::default();
        store
            .write("/cmd", json!({"motor": "IDLE", "note": "keep"}))
            .await
            .unwrap();
        store
            .merge("/cmd", json!({"motor": "EXTEND", "updatedAt": 5}))
            .await
            .unwrap();
        assert_eq!(
            store.get("/cmd"),
            Some(json!({"motor": "EXTEND", "note": "keep", "updatedAt": 5}))
        );
    }

    #[tokio::test]
    async fn should_remove_key_when_merging_null() {
        let store = InMemoryStore::default();
        store
            .merge("/cmd", json!({"motor": "EXTEND", "source": "http"}))
            .await
            .unwrap();
        store
            .merge("/cmd", json!({"motor": "IDLE", "source": null}))
            .await
            .unwrap();
        assert_eq!(store.get("/cmd"), Some(json!({"motor": "IDLE"})));
    }

    #[tokio::test]
    async fn should_create_object_when_merging_into_empty_path() {
        let store = InMemoryStore::default();
        store.merge("/cmd", json!({"motor": "IDLE"})).await.unwrap();
        assert_eq!(store.get("/cmd"), Some(json!({"motor": "IDLE"})));
    }

    #[tokio::test]
    async fn should_reject_merge_into_scalar() {
        let store = InMemoryStore::default();
        store.write("/cmd", json!("EXTEND")).await.unwrap();
        let err = store.merge("/cmd", json!({"motor": "IDLE"})).await.unwrap_err();
        assert!(matches!(err, ClotheslineError::Store(_)));
        assert_eq!(store.get("/cmd"), Some(json!("EXTEND")));
    }

    #[tokio::test]
    async fn should_reject_relative_path() {
        let store = InMemoryStore::default();
        assert!(store.write("status", json!(1)).await.is_err());
    }

    #[tokio::test]
    async fn should_remove_value_when_writing_null() {
        let store = InMemoryStore::default();
        store.write("/a", json!(1)).await.unwrap();
        store.write("/a", Value::Null).await.unwrap();
        assert_eq!(store.get("/a"), None);
    }

    #[tokio::test]
    async fn should_fail_every_operation_while_offline() {
        let store = InMemoryStore::default();
        store.write("/a", json!(1)).await.unwrap();
        store.set_offline(true);

        assert!(store.write("/a", json!(2)).await.is_err());
        assert!(store.merge("/b", json!({})).await.is_err());
        assert!(store.read("/a").await.is_err());

        store.set_offline(false);
        assert_eq!(store.read("/a").await.unwrap(), Some(json!(1)));
    }

    #[tokio::test]
    async fn should_deliver_current_value_then_changes_to_subscriber() {
        let store = InMemoryStore::default();
        store.write("/s", json!(1)).await.unwrap();
        let mut sub = store.subscribe("/s");

        store.write("/s", json!(2)).await.unwrap();
        store.merge("/other", json!({"k": 1})).await.unwrap();

        assert_eq!(sub.next().await, Some(json!(1)));
        assert_eq!(sub.next().await, Some(json!(2)));
        assert_eq!(sub.path(), "/s");
    }

    #[tokio::test]
    async fn should_deliver_merged_object_to_subscriber() {
        let store = InMemoryStore::default();
        let mut sub = store.subscribe("/cmd");
        store.merge("/cmd", json!({"a": 1})).await.unwrap();
        store.merge("/cmd", json!({"b": 2})).await.unwrap();

        assert_eq!(sub.next().await, Some(json!({"a": 1})));
        assert_eq!(sub.next().await, Some(json!({"a": 1, "b": 2})));
    }

    #[tokio::test]
    async fn should_not_notify_on_failed_write() {
        let store = InMemoryStore::default();
        let mut sub = store.subscribe("/s");
        store.set_offline(true);
        let _ = store.write("/s", json!(1)).await;
        store.set_offline(false);
        store.write("/s", json!(2)).await.unwrap();

        assert_eq!(sub.next().await, Some(json!(2)));
    }
}
