use std::any::Any;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::collector::{Collector, FieldInfo, TypedCollector, encode, str_field};

/// One choice of a select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
  #[serde(default)]
  pub label: String,
  pub value: String,
}

/// Options of a field; malformed entries are dropped.
fn parse_options(json: &Value) -> Vec<SelectOption> {
  json
    .get("options")
    .and_then(Value::as_array)
    .map(|options| {
      options
        .iter()
        .filter_map(|o| serde_json::from_value(o.clone()).ok())
        .collect()
    })
    .unwrap_or_default()
}

/// Single choice (`SINGLE_SELECT`: dropdown, radio).
#[derive(Debug, Clone)]
pub struct SingleSelectCollector {
  info: FieldInfo,
  options: Vec<SelectOption>,
  value: String,
}

impl SingleSelectCollector {
  pub fn from_json(json: &Value) -> Self {
    Self {
      info: FieldInfo::from_json(json),
      options: parse_options(json),
      value: str_field(json, "value"),
    }
  }

  pub fn options(&self) -> &[SelectOption] {
    &self.options
  }

  pub fn selected(&self) -> Option<&str> {
    (!self.value.is_empty()).then_some(self.value.as_str())
  }
}

impl Collector for SingleSelectCollector {
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
    if let Some(selected) = value.as_str() {
      self.value = selected.to_string();
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

impl TypedCollector for SingleSelectCollector {
  type Payload = String;

  fn value(&self) -> Option<String> {
    self.selected().map(str::to_string)
  }
}

/// Multiple choice (`MULTI_SELECT`: checkbox, combobox).
#[derive(Debug, Clone)]
pub struct MultiSelectCollector {
  info: FieldInfo,
  options: Vec<SelectOption>,
  values: Vec<String>,
}

impl MultiSelectCollector {
  pub fn from_json(json: &Value) -> Self {
    let mut collector = Self {
      info: FieldInfo::from_json(json),
      options: parse_options(json),
      values: Vec::new(),
    };
    if let Some(initial) = json.get("value") {
      collector.initialize(initial);
    }
    collector
  }

  pub fn options(&self) -> &[SelectOption] {
    &self.options
  }

  pub fn selected(&self) -> &[String] {
    &self.values
  }
}

impl Collector for MultiSelectCollector {
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

  /// Accepts an array of strings; anything else, including an array with a
  /// non-string element, is ignored.
  fn initialize(&mut self, value: &Value) {
    let Some(items) = value.as_array() else {
      return;
    };
    let values: Option<Vec<String>> = items
      .iter()
      .map(|item| item.as_str().map(str::to_string))
      .collect();
    if let Some(values) = values {
      self.values = values;
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

impl TypedCollector for MultiSelectCollector {
  type Payload = Vec<String>;

  fn value(&self) -> Option<Vec<String>> {
    (!self.values.is_empty()).then(|| self.values.clone())
  }
}
