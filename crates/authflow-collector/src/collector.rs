//! The collector contract shared by every field type.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// A local, pre-submission validation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
  /// The field is required but has no value.
  #[error("value is required")]
  Required,

  /// The value does not match the server-supplied pattern.
  #[error("{message}")]
  Regex { message: String },

  /// The value is shorter or longer than allowed. `max` is `None` when the
  /// policy sets no upper bound.
  #[error("{}", length_message(.min, .max))]
  InvalidLength { min: usize, max: Option<usize> },

  /// Too few distinct characters.
  #[error("must contain at least {min} unique characters")]
  UniqueCharacter { min: usize },

  /// A character repeats consecutively more often than allowed.
  #[error("must not repeat a character more than {max} times in a row")]
  MaxRepeat { max: usize },

  /// Too few characters from a required character set.
  #[error("must contain at least {min} of '{characters}'")]
  MinCharacters { characters: String, min: usize },
}

fn length_message(min: &usize, max: &Option<usize>) -> String {
  match max {
    Some(max) => format!("length must be between {min} and {max} characters"),
    None => format!("length must be at least {min} characters"),
  }
}

/// Back-reference to the step a collector belongs to.
///
/// Injected by [`CollectorRegistry::bind`](crate::CollectorRegistry::bind)
/// after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct StepBinding {
  /// The flow run the step belongs to.
  pub flow_id: Uuid,
  /// Server-assigned step identifier.
  pub step_id: String,
  /// The raw step payload the collectors were built from.
  pub payload: Arc<Value>,
}

/// Attributes every field description carries.
///
/// Missing or mistyped attributes fall back to defaults.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldInfo {
  pub kind: String,
  pub key: String,
  pub label: String,
  pub required: bool,
  pub raw: Value,
}

impl FieldInfo {
  pub fn from_json(json: &Value) -> Self {
    Self {
      kind: str_field(json, "type"),
      key: json
        .get("key")
        .or_else(|| json.get("name"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string(),
      label: str_field(json, "label"),
      required: json
        .get("required")
        .and_then(Value::as_bool)
        .unwrap_or(false),
      raw: json.clone(),
    }
  }
}

/// String attribute of a field, empty when missing or not a string.
pub(crate) fn str_field(json: &Value, name: &str) -> String {
  json
    .get(name)
    .and_then(Value::as_str)
    .unwrap_or_default()
    .to_string()
}

/// One input field of a continuable step.
///
/// The payload is type-erased to JSON so collectors of different types can
/// live in one list; [`TypedCollector`] exposes the typed value.
pub trait Collector: Send + Sync + fmt::Debug {
  /// Type discriminator the collector was built from (e.g. `TEXT`).
  fn kind(&self) -> &str;

  /// Submission key.
  fn key(&self) -> &str;

  /// Stable identifier; the key unless a collector says otherwise.
  fn id(&self) -> &str {
    self.key()
  }

  fn label(&self) -> &str;

  fn required(&self) -> bool;

  /// The raw field description.
  fn metadata(&self) -> &Value;

  /// Assign a value. A value of the wrong shape is ignored.
  fn initialize(&mut self, value: &Value);

  /// The value to submit, `None` to omit the field.
  fn payload(&self) -> Option<Value>;

  /// Local validation. An empty required field yields exactly one
  /// [`ValidationError::Required`].
  fn validate(&self) -> Vec<ValidationError> {
    if self.required() && self.payload().is_none() {
      vec![ValidationError::Required]
    } else {
      Vec::new()
    }
  }

  /// Whether this collector selects the action of the submission (buttons,
  /// links, social login) instead of contributing an input field.
  fn is_action(&self) -> bool {
    false
  }

  /// Receive the back-reference to the enclosing step.
  fn bind(&mut self, _binding: &StepBinding) {}

  fn as_any(&self) -> &dyn Any;

  fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn Collector {
  pub fn downcast_ref<T: Collector + 'static>(&self) -> Option<&T> {
    self.as_any().downcast_ref::<T>()
  }

  pub fn downcast_mut<T: Collector + 'static>(&mut self) -> Option<&mut T> {
    self.as_any_mut().downcast_mut::<T>()
  }
}

/// The typed view of a collector's payload.
pub trait TypedCollector: Collector {
  type Payload: Serialize;

  /// Current value, `None` when it is the type's empty representation.
  fn value(&self) -> Option<Self::Payload>;
}

/// Encode a typed payload for [`Collector::payload`].
pub(crate) fn encode<C: TypedCollector + ?Sized>(collector: &C) -> Option<Value> {
  collector
    .value()
    .and_then(|v| serde_json::to_value(v).ok())
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_field_info_defaults() {
    let info = FieldInfo::from_json(&json!({ "type": "TEXT" }));
    assert_eq!(info.kind, "TEXT");
    assert_eq!(info.key, "");
    assert_eq!(info.label, "");
    assert!(!info.required);
  }

  #[test]
  fn test_field_info_mistyped_attributes() {
    let info = FieldInfo::from_json(&json!({
      "type": "TEXT",
      "key": "username",
      "label": 42,
      "required": "yes"
    }));
    assert_eq!(info.key, "username");
    assert_eq!(info.label, "");
    assert!(!info.required);
  }

  #[test]
  fn test_length_message() {
    let bounded = ValidationError::InvalidLength {
      min: 8,
      max: Some(20),
    };
    assert_eq!(bounded.to_string(), "length must be between 8 and 20 characters");

    let open = ValidationError::InvalidLength { min: 12, max: None };
    assert_eq!(open.to_string(), "length must be at least 12 characters");
  }

  #[test]
  fn test_field_info_name_fallback() {
    let info = FieldInfo::from_json(&json!({ "type": "TEXT", "name": "email" }));
    assert_eq!(info.key, "email");
  }
}
