//! In-memory store double shared by the service tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use tokio::sync::broadcast;

use clothesline_domain::error::ClotheslineError;

use crate::ports::{SharedStore, Subscription};

#[derive(Debug, Clone, PartialEq)]
pub enum StoreOp {
    Write(String, Value),
    Merge(String, Value),
}

/// Records every write and merge, and fans changes out to subscribers.
#[derive(Default)]
pub struct RecordingStore {
    values: Mutex<HashMap<String, Value>>,
    senders: Mutex<HashMap<String, broadcast::Sender<Value>>>,
    ops: Mutex<Vec<StoreOp>>,
    failing: AtomicBool,
}

impl RecordingStore {
    pub fn failing() -> Self {
        let store = Self::default();
        store.failing.store(true, Ordering::SeqCst);
        store
    }

    pub fn ops(&self) -> Vec<StoreOp> {
        self.ops.lock().unwrap().clone()
    }

    /// Every value written to `path`, in order.
    pub fn writes_to(&self, path: &str) -> Vec<Value> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                StoreOp::Write(p, v) if p == path => Some(v),
                _ => None,
            })
            .collect()
    }

    /// Every partial merged into `path`, in order.
    pub fn merges_to(&self, path: &str) -> Vec<Value> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                StoreOp::Merge(p, v) if p == path => Some(v),
                _ => None,
            })
            .collect()
    }

    pub fn value(&self, path: &str) -> Option<Value> {
        self.values.lock().unwrap().get(path).cloned()
    }

    fn sender(&self, path: &str) -> broadcast::Sender<Value> {
        self.senders
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_insert_with(|| broadcast::channel(64).0)
            .clone()
    }

    fn apply(&self, op: StoreOp) -> Result<(), ClotheslineError> {
        self.ops.lock().unwrap().push(op.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(ClotheslineError::store(std::io::Error::other(
                "store offline",
            )));
        }
        let (path, value) = {
            let mut values = self.values.lock().unwrap();
            match op {
                StoreOp::Write(path, value) => {
                    values.insert(path.clone(), value.clone());
                    (path, value)
                }
                StoreOp::Merge(path, partial) => {
                    let entry = values
                        .entry(path.clone())
                        .or_insert_with(|| Value::Object(serde_json::Map::new()));
                    if let (Some(target), Some(source)) = (entry.as_object_mut(), partial.as_object())
                    {
                        for (k, v) in source {
                            if v.is_null() {
                                target.remove(k);
                            } else {
                                target.insert(k.clone(), v.clone());
                            }
                        }
                    }
                    (path, entry.clone())
                }
            }
        };
        let _ = self.sender(&path).send(value);
        Ok(())
    }
}

impl SharedStore for RecordingStore {
    fn write(
        &self,
        path: &str,
        value: Value,
    ) -> impl Future<Output = Result<(), ClotheslineError>> + Send {
        let result = self.apply(StoreOp::Write(path.to_string(), value));
        async { result }
    }

    fn merge(
        &self,
        path: &str,
        partial: Value,
    ) -> impl Future<Output = Result<(), ClotheslineError>> + Send {
        let result = self.apply(StoreOp::Merge(path.to_string(), partial));
        async { result }
    }

    fn read(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<Option<Value>, ClotheslineError>> + Send {
        let value = self.value(path);
        async { Ok(value) }
    }

    fn subscribe(&self, path: &str) -> Subscription {
        let receiver = self.sender(path).subscribe();
        Subscription::new(path, self.value(path), receiver)
    }
}
