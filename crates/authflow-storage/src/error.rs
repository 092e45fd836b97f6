//! Storage errors.

/// Errors that can occur while reading or writing stored credentials.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
  /// Underlying file or device I/O failed.
  #[error("storage i/o failed: {0}")]
  Io(#[from] std::io::Error),

  /// Stored bytes could not be encoded or decoded.
  #[error("failed to serialize stored item: {0}")]
  Serialization(#[from] serde_json::Error),

  /// Backend-specific failure (keychain, remote store, ...).
  #[error("storage backend error: {message}")]
  Backend { message: String },
}

impl StorageError {
  pub fn backend(message: impl Into<String>) -> Self {
    Self::Backend {
      message: message.into(),
    }
  }
}
