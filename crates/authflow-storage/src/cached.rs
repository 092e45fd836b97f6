use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{Storage, StorageError};

/// Keeps the last read or written item in memory in front of another store.
///
/// The first `get` loads from the inner store; later reads are served from
/// the cache. Writes and deletes go through to the inner store before the
/// cache is updated.
pub struct CachedStorage<T, S> {
  inner: S,
  cache: Mutex<Option<Option<T>>>,
}

impl<T, S> CachedStorage<T, S> {
  pub fn new(inner: S) -> Self {
    Self {
      inner,
      cache: Mutex::new(None),
    }
  }

  /// Forget the cached item; the next read goes to the inner store.
  pub async fn invalidate(&self) {
    *self.cache.lock().await = None;
  }
}

#[async_trait]
impl<T, S> Storage<T> for CachedStorage<T, S>
where
  T: Clone + Send + Sync + 'static,
  S: Storage<T>,
{
  async fn get(&self) -> Result<Option<T>, StorageError> {
    let mut cache = self.cache.lock().await;
    if let Some(cached) = cache.as_ref() {
      return Ok(cached.clone());
    }
    let loaded = self.inner.get().await?;
    *cache = Some(loaded.clone());
    Ok(loaded)
  }

  async fn save(&self, item: T) -> Result<(), StorageError> {
    let mut cache = self.cache.lock().await;
    self.inner.save(item.clone()).await?;
    *cache = Some(Some(item));
    Ok(())
  }

  async fn delete(&self) -> Result<(), StorageError> {
    let mut cache = self.cache.lock().await;
    self.inner.delete().await?;
    *cache = Some(None);
    Ok(())
  }
}
