//! Device binding (`DEVICE_BINDING`).
//!
//! The server sends a challenge; the device signs it with a key bound to
//! the user and submits the signature. Key storage and signing are platform
//! work and live behind [`KeySigner`].

use std::any::Any;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::collector::{Collector, FieldInfo, TypedCollector, encode, str_field};
use crate::error::CapabilityError;

/// What the signer is asked to sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningRequest {
  pub user_id: String,
  pub username: String,
  pub challenge: String,
  /// Local authentication the key requires (`NONE`, `BIOMETRIC_ONLY`, ...).
  pub authentication: String,
  pub timeout_secs: u64,
}

/// Creates or looks up the user's device key and signs a challenge with it.
#[async_trait]
pub trait KeySigner: Send + Sync {
  /// Returns the signed challenge, usually a compact JWS.
  async fn sign(&self, request: SigningRequest) -> Result<String, CapabilityError>;
}

const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct DeviceBindingCollector {
  info: FieldInfo,
  user_id: String,
  username: String,
  challenge: String,
  authentication: String,
  timeout_secs: u64,
  signature: Option<String>,
}

impl DeviceBindingCollector {
  pub fn from_json(json: &Value) -> Self {
    let authentication = match str_field(json, "authenticationType") {
      kind if kind.is_empty() => "NONE".to_string(),
      kind => kind,
    };
    Self {
      info: FieldInfo::from_json(json),
      user_id: str_field(json, "userId"),
      username: str_field(json, "username"),
      challenge: str_field(json, "challenge"),
      authentication,
      timeout_secs: json
        .get("timeout")
        .and_then(Value::as_u64)
        .unwrap_or(DEFAULT_TIMEOUT_SECS),
      signature: None,
    }
  }

  pub fn user_id(&self) -> &str {
    &self.user_id
  }

  pub fn challenge(&self) -> &str {
    &self.challenge
  }

  pub fn authentication(&self) -> &str {
    &self.authentication
  }

  pub fn timeout_secs(&self) -> u64 {
    self.timeout_secs
  }

  /// Sign the challenge and keep the signature as the payload.
  pub async fn bind_device(&mut self, signer: &dyn KeySigner) -> Result<(), CapabilityError> {
    if self.challenge.is_empty() {
      return Err(CapabilityError::missing(&self.info.key, "challenge"));
    }
    if self.user_id.is_empty() {
      return Err(CapabilityError::missing(&self.info.key, "userId"));
    }

    info!(key = %self.info.key, authentication = %self.authentication, "binding device");
    let signature = signer
      .sign(SigningRequest {
        user_id: self.user_id.clone(),
        username: self.username.clone(),
        challenge: self.challenge.clone(),
        authentication: self.authentication.clone(),
        timeout_secs: self.timeout_secs,
      })
      .await?;
    self.signature = Some(signature);
    Ok(())
  }
}

impl Collector for DeviceBindingCollector {
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

  /// Accepts a signature produced outside the collector.
  fn initialize(&mut self, value: &Value) {
    if let Some(signature) = value.as_str().filter(|s| !s.is_empty()) {
      self.signature = Some(signature.to_string());
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

impl TypedCollector for DeviceBindingCollector {
  type Payload = String;

  fn value(&self) -> Option<String> {
    self.signature.clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  struct EchoSigner;

  #[async_trait]
  impl KeySigner for EchoSigner {
    async fn sign(&self, request: SigningRequest) -> Result<String, CapabilityError> {
      Ok(format!("signed.{}.{}", request.user_id, request.challenge))
    }
  }

  struct DeclinedSigner;

  #[async_trait]
  impl KeySigner for DeclinedSigner {
    async fn sign(&self, _request: SigningRequest) -> Result<String, CapabilityError> {
      Err(CapabilityError::Cancelled)
    }
  }

  fn binding() -> DeviceBindingCollector {
    DeviceBindingCollector::from_json(&json!({
      "type": "DEVICE_BINDING",
      "key": "binding",
      "required": true,
      "userId": "u-1",
      "username": "alice",
      "challenge": "nonce-42",
      "authenticationType": "BIOMETRIC_ONLY"
    }))
  }

  #[test]
  fn test_defaults() {
    let collector = DeviceBindingCollector::from_json(&json!({ "type": "DEVICE_BINDING" }));
    assert_eq!(collector.authentication(), "NONE");
    assert_eq!(collector.timeout_secs(), 60);
    assert_eq!(collector.payload(), None);
  }

  #[tokio::test]
  async fn test_bind_sets_signature() {
    let mut collector = binding();
    assert!(!collector.validate().is_empty());

    collector.bind_device(&EchoSigner).await.unwrap();
    assert_eq!(collector.payload(), Some(json!("signed.u-1.nonce-42")));
    assert!(collector.validate().is_empty());
  }

  #[tokio::test]
  async fn test_declined_leaves_payload_empty() {
    let mut collector = binding();
    assert_eq!(
      collector.bind_device(&DeclinedSigner).await,
      Err(CapabilityError::Cancelled)
    );
    assert_eq!(collector.payload(), None);
  }

  #[tokio::test]
  async fn test_missing_challenge() {
    let mut collector = DeviceBindingCollector::from_json(&json!({
      "type": "DEVICE_BINDING",
      "key": "binding",
      "userId": "u-1"
    }));
    assert_eq!(
      collector.bind_device(&EchoSigner).await,
      Err(CapabilityError::MissingAttribute {
        key: "binding".to_string(),
        attribute: "challenge".to_string()
      })
    );
  }
}
