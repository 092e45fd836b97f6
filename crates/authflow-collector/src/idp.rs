use std::any::Any;

use serde_json::Value;
use tracing::info;

use crate::collector::{Collector, FieldInfo, TypedCollector, encode, str_field};
use crate::error::PresentError;
use crate::presenter::{PresentRequest, Presenter};

/// Social / external identity provider login (`SOCIAL_LOGIN_BUTTON`).
///
/// [`authorize`](Self::authorize) hands `links.authenticate.href` to a
/// [`Presenter`] and keeps the returned callback as the payload.
#[derive(Debug, Clone)]
pub struct IdpCollector {
  info: FieldInfo,
  idp_type: String,
  idp_name: String,
  authenticate_url: Option<String>,
  callback: Option<String>,
}

impl IdpCollector {
  pub fn from_json(json: &Value) -> Self {
    Self {
      info: FieldInfo::from_json(json),
      idp_type: str_field(json, "idpType"),
      idp_name: str_field(json, "idpName"),
      authenticate_url: json
        .pointer("/links/authenticate/href")
        .and_then(Value::as_str)
        .map(str::to_string),
      callback: None,
    }
  }

  pub fn idp_type(&self) -> &str {
    &self.idp_type
  }

  pub fn idp_name(&self) -> &str {
    &self.idp_name
  }

  pub fn authenticate_url(&self) -> Option<&str> {
    self.authenticate_url.as_deref()
  }

  /// Present the provider's login and wait for its callback.
  pub async fn authorize(
    &mut self,
    presenter: &dyn Presenter,
    redirect_uri: &str,
  ) -> Result<(), PresentError> {
    let url = self
      .authenticate_url
      .clone()
      .ok_or_else(|| PresentError::MissingUrl {
        key: self.info.key.clone(),
      })?;

    info!(idp = %self.idp_type, "presenting identity provider");
    let callback = presenter
      .present(PresentRequest {
        url,
        redirect_uri: redirect_uri.to_string(),
      })
      .await?;
    self.callback = Some(callback);
    Ok(())
  }
}

impl Collector for IdpCollector {
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

  /// Accepts the callback directly, for hosts that run the presentation
  /// themselves.
  fn initialize(&mut self, value: &Value) {
    if let Some(callback) = value.as_str().filter(|s| !s.is_empty()) {
      self.callback = Some(callback.to_string());
    }
  }

  fn payload(&self) -> Option<Value> {
    encode(self)
  }

  fn is_action(&self) -> bool {
    true
  }

  fn as_any(&self) -> &dyn Any {
    self
  }

  fn as_any_mut(&mut self) -> &mut dyn Any {
    self
  }
}

impl TypedCollector for IdpCollector {
  type Payload = String;

  fn value(&self) -> Option<String> {
    self.callback.clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::collector::ValidationError;
  use async_trait::async_trait;
  use serde_json::json;

  struct CallbackPresenter;

  #[async_trait]
  impl Presenter for CallbackPresenter {
    async fn present(&self, request: PresentRequest) -> Result<String, PresentError> {
      assert_eq!(request.url, "https://idp.example.com/auth");
      Ok(format!("{}?state=xyz", request.redirect_uri))
    }
  }

  fn google() -> IdpCollector {
    IdpCollector::from_json(&json!({
      "type": "SOCIAL_LOGIN_BUTTON",
      "key": "google",
      "label": "Sign in with Google",
      "idpType": "GOOGLE",
      "links": { "authenticate": { "href": "https://idp.example.com/auth" } }
    }))
  }

  #[tokio::test]
  async fn test_authorize_sets_payload() {
    let mut collector = google();
    assert_eq!(collector.payload(), None);

    collector
      .authorize(&CallbackPresenter, "app://callback")
      .await
      .unwrap();
    assert_eq!(collector.payload(), Some(json!("app://callback?state=xyz")));
  }

  #[tokio::test]
  async fn test_missing_url() {
    let mut collector = IdpCollector::from_json(&json!({
      "type": "SOCIAL_LOGIN_BUTTON",
      "key": "apple"
    }));
    let result = collector.authorize(&CallbackPresenter, "app://callback").await;
    assert_eq!(
      result,
      Err(PresentError::MissingUrl {
        key: "apple".to_string()
      })
    );
  }

  #[tokio::test]
  async fn test_required_until_authorized() {
    let mut collector = IdpCollector::from_json(&json!({
      "type": "SOCIAL_LOGIN_BUTTON",
      "key": "google",
      "required": true,
      "links": { "authenticate": { "href": "https://idp.example.com/auth" } }
    }));
    assert!(collector.required());
    assert_eq!(collector.validate(), vec![ValidationError::Required]);

    collector
      .authorize(&CallbackPresenter, "app://callback")
      .await
      .unwrap();
    assert!(collector.validate().is_empty());
  }
}
