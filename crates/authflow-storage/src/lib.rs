//! Credential storage for authflow.
//!
//! Session-persisting modules read and write through the [`Storage`] trait.
//! Platform keychains live outside this crate; they plug in by implementing
//! the trait.

mod cached;
mod error;
mod file;
mod memory;

use async_trait::async_trait;

pub use cached::CachedStorage;
pub use error::StorageError;
pub use file::FileStorage;
pub use memory::MemoryStorage;

/// A single-slot store for one credential item.
///
/// Implementations must tolerate concurrent calls, though the engine only
/// touches a store from one flow at a time.
#[async_trait]
pub trait Storage<T>: Send + Sync
where
  T: Send + Sync + 'static,
{
  /// Read the stored item, `None` if nothing has been saved.
  async fn get(&self) -> Result<Option<T>, StorageError>;

  /// Replace the stored item.
  async fn save(&self, item: T) -> Result<(), StorageError>;

  /// Remove the stored item. Deleting an empty store is not an error.
  async fn delete(&self) -> Result<(), StorageError>;
}
