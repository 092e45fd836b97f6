//! Policy evaluation for authflow.
//!
//! The server attaches a configuration object to a protected operation, keyed
//! by policy name. [`PolicyEvaluator`] runs the registered policies that the
//! configuration names, in registration order, and reports the first one that
//! fails.
//!
//! The evaluator fails open: a missing, empty or unparsable configuration is
//! compliant, and a policy that errors is skipped.

mod builtin;
mod error;
mod evaluator;

use async_trait::async_trait;

pub use builtin::{
  BiometricAvailablePolicy, BiometricCapability, DeviceTamperingPolicy, FnPolicy, TamperDetector,
};
pub use error::PolicyError;
pub use evaluator::{MfaPolicyResult, PolicyEvaluator};

/// A named predicate over a JSON configuration blob.
#[async_trait]
pub trait Policy: Send + Sync {
  /// Key under which the server configures this policy.
  fn name(&self) -> &str;

  /// `Ok(true)` when the device/session complies.
  async fn evaluate(&self, config: &serde_json::Value) -> Result<bool, PolicyError>;
}
