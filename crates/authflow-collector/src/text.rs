use std::any::Any;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::collector::{Collector, FieldInfo, TypedCollector, ValidationError, encode, str_field};

/// Free-text input (`TEXT`).
///
/// An optional `validation { regex, errorMessage }` object adds a pattern
/// check. A pattern the client cannot compile is ignored.
#[derive(Debug, Clone)]
pub struct TextCollector {
  info: FieldInfo,
  value: String,
  pattern: Option<(Regex, String)>,
}

impl TextCollector {
  pub fn from_json(json: &Value) -> Self {
    let pattern = json.get("validation").and_then(|validation| {
      let source = validation.get("regex").and_then(Value::as_str)?;
      match Regex::new(source) {
        Ok(regex) => {
          let message = validation
            .get("errorMessage")
            .and_then(Value::as_str)
            .unwrap_or("value does not match the required format")
            .to_string();
          Some((regex, message))
        }
        Err(e) => {
          debug!(pattern = %source, error = %e, "ignoring invalid validation pattern");
          None
        }
      }
    });

    Self {
      info: FieldInfo::from_json(json),
      value: str_field(json, "value"),
      pattern,
    }
  }

  pub fn text(&self) -> &str {
    &self.value
  }

  pub fn set_text(&mut self, value: impl Into<String>) {
    self.value = value.into();
  }
}

impl Collector for TextCollector {
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
    if let Some(text) = value.as_str() {
      self.value = text.to_string();
    }
  }

  fn payload(&self) -> Option<Value> {
    encode(self)
  }

  fn validate(&self) -> Vec<ValidationError> {
    if self.value.is_empty() {
      return if self.info.required {
        vec![ValidationError::Required]
      } else {
        Vec::new()
      };
    }

    match &self.pattern {
      Some((regex, message)) if !regex.is_match(&self.value) => vec![ValidationError::Regex {
        message: message.clone(),
      }],
      _ => Vec::new(),
    }
  }

  fn as_any(&self) -> &dyn Any {
    self
  }

  fn as_any_mut(&mut self) -> &mut dyn Any {
    self
  }
}

impl TypedCollector for TextCollector {
  type Payload = String;

  fn value(&self) -> Option<String> {
    (!self.value.is_empty()).then(|| self.value.clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn username() -> TextCollector {
    TextCollector::from_json(&json!({
      "type": "TEXT",
      "key": "username",
      "label": "Username",
      "required": true
    }))
  }

  #[test]
  fn test_required_and_empty() {
    let collector = username();
    assert_eq!(collector.payload(), None);
    assert_eq!(collector.validate(), vec![ValidationError::Required]);
  }

  #[test]
  fn test_initialize_ignores_wrong_shape() {
    let mut collector = username();
    collector.initialize(&json!("alice"));
    collector.initialize(&json!(42));
    collector.initialize(&json!(["bob"]));

    assert_eq!(collector.text(), "alice");
    assert_eq!(collector.payload(), Some(json!("alice")));
    assert!(collector.validate().is_empty());
  }

  #[test]
  fn test_payload_is_idempotent() {
    let mut collector = username();
    collector.initialize(&json!("alice"));
    assert_eq!(collector.payload(), collector.payload());
  }

  #[test]
  fn test_default_value_from_json() {
    let collector = TextCollector::from_json(&json!({
      "type": "TEXT",
      "key": "username",
      "value": "alice"
    }));
    assert_eq!(collector.payload(), Some(json!("alice")));
  }

  #[test]
  fn test_regex_validation() {
    let mut collector = TextCollector::from_json(&json!({
      "type": "TEXT",
      "key": "email",
      "validation": { "regex": "^[^@]+@[^@]+$", "errorMessage": "Enter a valid email" }
    }));

    collector.initialize(&json!("not-an-email"));
    assert_eq!(
      collector.validate(),
      vec![ValidationError::Regex {
        message: "Enter a valid email".to_string()
      }]
    );

    collector.initialize(&json!("alice@example.com"));
    assert!(collector.validate().is_empty());
  }

  #[test]
  fn test_invalid_regex_is_ignored() {
    let mut collector = TextCollector::from_json(&json!({
      "type": "TEXT",
      "key": "code",
      "validation": { "regex": "([" }
    }));
    collector.initialize(&json!("anything"));
    assert!(collector.validate().is_empty());
  }

  #[test]
  fn test_optional_empty_is_valid() {
    let collector = TextCollector::from_json(&json!({ "type": "TEXT", "key": "nickname" }));
    assert!(collector.validate().is_empty());
    assert_eq!(collector.payload(), None);
  }
}
