//! Built-in policies.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::{Policy, PolicyError};

/// Platform hook reporting whether biometric authentication can be used.
#[async_trait]
pub trait BiometricCapability: Send + Sync {
  async fn is_available(&self) -> Result<bool, PolicyError>;
}

/// Passes when biometrics are available. Configured under `"biometricAvailable"`.
pub struct BiometricAvailablePolicy {
  capability: Arc<dyn BiometricCapability>,
}

impl BiometricAvailablePolicy {
  pub const NAME: &'static str = "biometricAvailable";

  pub fn new(capability: Arc<dyn BiometricCapability>) -> Self {
    Self { capability }
  }
}

#[async_trait]
impl Policy for BiometricAvailablePolicy {
  fn name(&self) -> &str {
    Self::NAME
  }

  async fn evaluate(&self, _config: &Value) -> Result<bool, PolicyError> {
    self.capability.is_available().await
  }
}

/// Platform hook scoring how likely the device is compromised, in `[0, 1]`.
#[async_trait]
pub trait TamperDetector: Send + Sync {
  async fn score(&self) -> Result<f64, PolicyError>;
}

/// Fails when the tamper score reaches `config.score`.
///
/// Configured under `"deviceTampering"` as `{"score": 0.8}`.
pub struct DeviceTamperingPolicy {
  detector: Arc<dyn TamperDetector>,
}

impl DeviceTamperingPolicy {
  pub const NAME: &'static str = "deviceTampering";

  pub fn new(detector: Arc<dyn TamperDetector>) -> Self {
    Self { detector }
  }
}

#[async_trait]
impl Policy for DeviceTamperingPolicy {
  fn name(&self) -> &str {
    Self::NAME
  }

  async fn evaluate(&self, config: &Value) -> Result<bool, PolicyError> {
    let threshold = config
      .get("score")
      .and_then(Value::as_f64)
      .ok_or_else(|| PolicyError::invalid_config(Self::NAME, "expected numeric 'score'"))?;
    let score = self.detector.score().await?;
    Ok(score < threshold)
  }
}

type PolicyFn = dyn Fn(&Value) -> Result<bool, PolicyError> + Send + Sync;

/// Policy backed by a synchronous closure.
pub struct FnPolicy {
  name: String,
  f: Box<PolicyFn>,
}

impl FnPolicy {
  pub fn new<F>(name: impl Into<String>, f: F) -> Self
  where
    F: Fn(&Value) -> Result<bool, PolicyError> + Send + Sync + 'static,
  {
    Self {
      name: name.into(),
      f: Box::new(f),
    }
  }
}

#[async_trait]
impl Policy for FnPolicy {
  fn name(&self) -> &str {
    &self.name
  }

  async fn evaluate(&self, config: &Value) -> Result<bool, PolicyError> {
    (self.f)(config)
  }
}
