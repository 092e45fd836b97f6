use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{Storage, StorageError};

/// In-memory storage. Contents are lost when the value is dropped.
#[derive(Debug)]
pub struct MemoryStorage<T> {
  item: RwLock<Option<T>>,
}

impl<T> MemoryStorage<T> {
  pub fn new() -> Self {
    Self {
      item: RwLock::new(None),
    }
  }
}

impl<T> Default for MemoryStorage<T> {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl<T> Storage<T> for MemoryStorage<T>
where
  T: Clone + Send + Sync + 'static,
{
  async fn get(&self) -> Result<Option<T>, StorageError> {
    Ok(self.item.read().await.clone())
  }

  async fn save(&self, item: T) -> Result<(), StorageError> {
    *self.item.write().await = Some(item);
    Ok(())
  }

  async fn delete(&self) -> Result<(), StorageError> {
    *self.item.write().await = None;
    Ok(())
  }
}
