//! Policy errors.

/// Errors a policy may raise while evaluating. The evaluator logs them and
/// skips the policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
  /// The policy's configuration has the wrong shape.
  #[error("invalid configuration for policy '{policy}': {message}")]
  InvalidConfig { policy: String, message: String },

  /// A device capability the policy depends on failed.
  #[error("capability unavailable: {message}")]
  Capability { message: String },
}

impl PolicyError {
  pub fn invalid_config(policy: impl Into<String>, message: impl Into<String>) -> Self {
    Self::InvalidConfig {
      policy: policy.into(),
      message: message.into(),
    }
  }

  pub fn capability(message: impl Into<String>) -> Self {
    Self::Capability {
      message: message.into(),
    }
  }
}
