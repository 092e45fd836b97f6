//! reCAPTCHA Enterprise (`RECAPTCHA_ENTERPRISE`).

use std::any::Any;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::collector::{Collector, FieldInfo, TypedCollector, encode, str_field};
use crate::error::CapabilityError;

const DEFAULT_ACTION: &str = "login";

/// Parameters for one token execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
  pub site_key: String,
  pub action: String,
}

/// The platform reCAPTCHA client. Returns the token to send to the server
/// for assessment.
#[async_trait]
pub trait TokenProvider: Send + Sync {
  async fn execute(&self, request: TokenRequest) -> Result<String, CapabilityError>;
}

/// Obtains a reCAPTCHA token for the step's site key and submits it.
#[derive(Debug, Clone)]
pub struct RecaptchaCollector {
  info: FieldInfo,
  site_key: String,
  action: String,
  token: Option<String>,
}

impl RecaptchaCollector {
  pub fn from_json(json: &Value) -> Self {
    let action = match str_field(json, "action") {
      action if action.is_empty() => DEFAULT_ACTION.to_string(),
      action => action,
    };
    Self {
      info: FieldInfo::from_json(json),
      site_key: str_field(json, "siteKey"),
      action,
      token: None,
    }
  }

  pub fn site_key(&self) -> &str {
    &self.site_key
  }

  pub fn action(&self) -> &str {
    &self.action
  }

  /// Execute the provider and keep the token as the payload.
  pub async fn verify(&mut self, provider: &dyn TokenProvider) -> Result<(), CapabilityError> {
    if self.site_key.is_empty() {
      return Err(CapabilityError::missing(&self.info.key, "siteKey"));
    }
    debug!(action = %self.action, "executing recaptcha");
    let token = provider
      .execute(TokenRequest {
        site_key: self.site_key.clone(),
        action: self.action.clone(),
      })
      .await?;
    self.token = Some(token).filter(|t| !t.is_empty());
    Ok(())
  }
}

impl Collector for RecaptchaCollector {
  fn kind(&self) -> &str {
    &self.info.kind
  }

  fn key(&self) -> &str {
    &self.info.key
  }

  fn label(&self) -> &str {
    &self.info.label
  }

  fn required(&self) -> bool {
    self.info.required
  }

  fn metadata(&self) -> &Value {
    &self.info.raw
  }

  fn initialize(&mut self, value: &Value) {
    if let Some(token) = value.as_str().filter(|s| !s.is_empty()) {
      self.token = Some(token.to_string());
    }
  }

  fn payload(&self) -> Option<Value> {
    encode(self)
  }

  fn as_any(&self) -> &dyn Any {
    self
  }

  fn as_any_mut(&mut self) -> &mut dyn Any {
    self
  }
}

impl TypedCollector for RecaptchaCollector {
  type Payload = String;

  fn value(&self) -> Option<String> {
    self.token.clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  struct FixedProvider;

  #[async_trait]
  impl TokenProvider for FixedProvider {
    async fn execute(&self, request: TokenRequest) -> Result<String, CapabilityError> {
      assert_eq!(request.site_key, "site-123");
      Ok(format!("token-for-{}", request.action))
    }
  }

  #[tokio::test]
  async fn test_verify_sets_token() {
    let mut collector = RecaptchaCollector::from_json(&json!({
      "type": "RECAPTCHA_ENTERPRISE",
      "key": "captcha",
      "siteKey": "site-123",
      "action": "signup"
    }));
    collector.verify(&FixedProvider).await.unwrap();
    assert_eq!(collector.payload(), Some(json!("token-for-signup")));
  }

  #[tokio::test]
  async fn test_missing_site_key() {
    let mut collector = RecaptchaCollector::from_json(&json!({
      "type": "RECAPTCHA_ENTERPRISE",
      "key": "captcha",
      "required": true
    }));
    assert_eq!(collector.action(), "login");
    assert!(collector.verify(&FixedProvider).await.is_err());
    assert_eq!(collector.validate().len(), 1);
  }
}
