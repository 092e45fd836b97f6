//! Presentation errors.

/// Errors from an interactive presentation (browser, social login, ...).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PresentError {
  /// Another presentation is still waiting for its outcome.
  #[error("a presentation is already in progress")]
  AlreadyInProgress,

  /// The user dismissed the presentation.
  #[error("presentation cancelled")]
  Cancelled,

  /// The field carries no URL to present.
  #[error("collector '{key}' has no url to present")]
  MissingUrl { key: String },

  /// The platform presenter failed.
  #[error("presentation failed: {message}")]
  Failed { message: String },
}

/// Errors from a platform capability backing a collector (device keys,
/// attestation tokens).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapabilityError {
  /// The device cannot provide the capability.
  #[error("capability unavailable: {message}")]
  Unavailable { message: String },

  /// The field lacks an attribute the capability needs.
  #[error("collector '{key}' is missing '{attribute}'")]
  MissingAttribute { key: String, attribute: String },

  /// The user declined, e.g. dismissed a biometric prompt.
  #[error("capability cancelled by the user")]
  Cancelled,

  /// The platform call failed.
  #[error("capability failed: {message}")]
  Failed { message: String },
}

impl CapabilityError {
  pub(crate) fn missing(key: &str, attribute: &str) -> Self {
    Self::MissingAttribute {
      key: key.to_string(),
      attribute: attribute.to_string(),
    }
  }
}
