use std::any::Any;

use serde_json::Value;

use crate::collector::{Collector, FieldInfo, TypedCollector, str_field};

/// Display-only text (`LABEL`). Never submitted.
#[derive(Debug, Clone)]
pub struct LabelCollector {
  info: FieldInfo,
  content: String,
}

impl LabelCollector {
  pub fn from_json(json: &Value) -> Self {
    Self {
      info: FieldInfo::from_json(json),
      content: str_field(json, "content"),
    }
  }

  pub fn content(&self) -> &str {
    &self.content
  }
}

impl Collector for LabelCollector {
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
    false
  }

  fn metadata(&self) -> &Value {
    &self.info.raw
  }

  fn initialize(&mut self, _value: &Value) {}

  fn payload(&self) -> Option<Value> {
    None
  }

  fn as_any(&self) -> &dyn Any {
    self
  }

  fn as_any_mut(&mut self) -> &mut dyn Any {
    self
  }
}

impl TypedCollector for LabelCollector {
  type Payload = ();

  fn value(&self) -> Option<()> {
    None
  }
}
