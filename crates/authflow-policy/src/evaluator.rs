use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::Policy;

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MfaPolicyResult {
  Compliant,
  /// Names the first policy that failed.
  NonCompliant { policy: String },
}

impl MfaPolicyResult {
  pub fn is_compliant(&self) -> bool {
    matches!(self, Self::Compliant)
  }
}

/// Evaluates a fixed, ordered set of policies.
#[derive(Clone, Default)]
pub struct PolicyEvaluator {
  policies: Vec<Arc<dyn Policy>>,
}

impl PolicyEvaluator {
  pub fn new(policies: Vec<Arc<dyn Policy>>) -> Self {
    Self { policies }
  }

  pub fn policies(&self) -> impl Iterator<Item = &str> {
    self.policies.iter().map(|p| p.name())
  }

  /// Evaluate against a configuration object keyed by policy name.
  ///
  /// Policies absent from the configuration are not invoked. Evaluation stops
  /// at the first policy returning `false`.
  pub async fn evaluate(&self, config: Option<&Value>) -> MfaPolicyResult {
    let Some(config) = config.and_then(Value::as_object) else {
      debug!("no policy configuration, compliant");
      return MfaPolicyResult::Compliant;
    };

    for policy in &self.policies {
      let Some(policy_config) = config.get(policy.name()) else {
        continue;
      };
      match policy.evaluate(policy_config).await {
        Ok(true) => {
          debug!(policy = %policy.name(), "policy passed");
        }
        Ok(false) => {
          debug!(policy = %policy.name(), "policy failed");
          return MfaPolicyResult::NonCompliant {
            policy: policy.name().to_string(),
          };
        }
        Err(e) => {
          warn!(policy = %policy.name(), error = %e, "policy evaluation failed, skipping");
        }
      }
    }

    MfaPolicyResult::Compliant
  }

  /// Evaluate against raw JSON text. Unparsable text is compliant.
  pub async fn evaluate_str(&self, config: &str) -> MfaPolicyResult {
    match serde_json::from_str::<Value>(config) {
      Ok(value) => self.evaluate(Some(&value)).await,
      Err(e) => {
        warn!(error = %e, "unparsable policy configuration, compliant");
        MfaPolicyResult::Compliant
      }
    }
  }
}
