use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tracing::debug;

use crate::{Storage, StorageError};

/// Stores one item as a JSON document on disk.
///
/// The parent directory is created on first save. A missing file reads as
/// empty.
#[derive(Debug)]
pub struct FileStorage<T> {
  path: PathBuf,
  _item: PhantomData<fn() -> T>,
}

impl<T> FileStorage<T> {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      _item: PhantomData,
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

#[async_trait]
impl<T> Storage<T> for FileStorage<T>
where
  T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
  async fn get(&self) -> Result<Option<T>, StorageError> {
    let content = match fs::read(&self.path).await {
      Ok(content) => content,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_slice(&content)?))
  }

  async fn save(&self, item: T) -> Result<(), StorageError> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      fs::create_dir_all(parent).await?;
    }
    let content = serde_json::to_vec(&item)?;
    fs::write(&self.path, content).await?;
    debug!(path = %self.path.display(), "stored item written");
    Ok(())
  }

  async fn delete(&self) -> Result<(), StorageError> {
    match fs::remove_file(&self.path).await {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e.into()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::Deserialize;

  #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
  struct Token {
    access: String,
    expires_in: u64,
  }

  #[tokio::test]
  async fn test_file_storage_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::<Token>::new(dir.path().join("nested").join("token.json"));

    assert_eq!(storage.get().await.unwrap(), None);

    let token = Token {
      access: "abc".to_string(),
      expires_in: 3600,
    };
    storage.save(token.clone()).await.unwrap();
    assert_eq!(storage.get().await.unwrap(), Some(token));

    storage.delete().await.unwrap();
    assert_eq!(storage.get().await.unwrap(), None);
    storage.delete().await.unwrap();
  }

  #[tokio::test]
  async fn test_file_storage_corrupt_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token.json");
    std::fs::write(&path, b"not json").unwrap();

    let storage = FileStorage::<Token>::new(&path);
    assert!(matches!(
      storage.get().await,
      Err(StorageError::Serialization(_))
    ));
  }
}
