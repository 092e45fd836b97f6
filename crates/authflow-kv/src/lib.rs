//! Key-value context for authflow.
//!
//! A [`Context`] is the scratch space modules use to hand data to each other.
//! The engine keeps two of them: one scoped to a single flow run and one that
//! lives as long as the workflow instance.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

type Value = Arc<dyn Any + Send + Sync>;

/// Mutable key-value mapping with type-erased values.
///
/// All operations take `&self`; the map is guarded by a lock so a context can
/// be shared between the modules of a flow without extra wrapping.
#[derive(Default)]
pub struct Context {
  values: RwLock<HashMap<String, Value>>,
}

impl Context {
  pub fn new() -> Self {
    Self::default()
  }

  /// Store a value, replacing whatever was under `key`.
  pub fn set<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
    self
      .values
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(key.into(), Arc::new(value));
  }

  /// Get a clone of the value under `key`.
  ///
  /// Returns `None` when the key is missing or holds a different type.
  pub fn get<T: Any + Clone>(&self, key: &str) -> Option<T> {
    let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
    values.get(key)?.downcast_ref::<T>().cloned()
  }

  /// Get a shared handle to the value under `key` without cloning it.
  pub fn get_arc<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
    let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
    values.get(key)?.clone().downcast::<T>().ok()
  }

  /// Read-modify-write the value under `key` while holding the write lock.
  ///
  /// The closure receives the current value (if present and of type `T`) and
  /// returns the value to store; returning `None` removes the key.
  pub fn update<T, F>(&self, key: &str, f: F)
  where
    T: Any + Clone + Send + Sync,
    F: FnOnce(Option<T>) -> Option<T>,
  {
    let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
    let current = values.get(key).and_then(|v| v.downcast_ref::<T>().cloned());
    match f(current) {
      Some(next) => {
        values.insert(key.to_string(), Arc::new(next));
      }
      None => {
        values.remove(key);
      }
    }
  }

  pub fn contains(&self, key: &str) -> bool {
    self
      .values
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .contains_key(key)
  }

  /// Remove a value. Returns whether the key was present.
  pub fn remove(&self, key: &str) -> bool {
    self
      .values
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .remove(key)
      .is_some()
  }

  pub fn keys(&self) -> Vec<String> {
    let mut keys: Vec<String> = self
      .values
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .keys()
      .cloned()
      .collect();
    keys.sort();
    keys
  }

  pub fn len(&self) -> usize {
    self.values.read().unwrap_or_else(PoisonError::into_inner).len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Drop every value.
  pub fn clear(&self) {
    self
      .values
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .clear();
  }
}

impl fmt::Debug for Context {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Context").field("keys", &self.keys()).finish()
  }
}
