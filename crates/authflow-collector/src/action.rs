use std::any::Any;

use serde_json::Value;

use crate::collector::{Collector, FieldInfo, StepBinding, TypedCollector, encode};

/// What activating an action does on the server side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
  /// Submit the step's inputs (`SUBMIT_BUTTON`, `ACTION`).
  Submit,
  /// Branch the flow (`FLOW_BUTTON`, `FLOW_LINK`).
  Flow,
}

/// A button or link that selects the action of a submission.
///
/// `initialize(true)` activates it; its payload is its key once active.
#[derive(Debug, Clone)]
pub struct ActionCollector {
  info: FieldInfo,
  action: ActionKind,
  activated: bool,
  binding: Option<StepBinding>,
}

impl ActionCollector {
  pub fn from_json(json: &Value, action: ActionKind) -> Self {
    Self {
      info: FieldInfo::from_json(json),
      action,
      activated: false,
      binding: None,
    }
  }

  pub fn action(&self) -> ActionKind {
    self.action
  }

  pub fn activate(&mut self) {
    self.activated = true;
  }

  pub fn is_activated(&self) -> bool {
    self.activated
  }

  /// The step this action belongs to, once bound.
  pub fn binding(&self) -> Option<&StepBinding> {
    self.binding.as_ref()
  }
}

impl Collector for ActionCollector {
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
    if let Some(activated) = value.as_bool() {
      self.activated = activated;
    }
  }

  fn payload(&self) -> Option<Value> {
    encode(self)
  }

  fn is_action(&self) -> bool {
    true
  }

  fn bind(&mut self, binding: &StepBinding) {
    self.binding = Some(binding.clone());
  }

  fn as_any(&self) -> &dyn Any {
    self
  }

  fn as_any_mut(&mut self) -> &mut dyn Any {
    self
  }
}

impl TypedCollector for ActionCollector {
  type Payload = String;

  fn value(&self) -> Option<String> {
    self.activated.then(|| self.info.key.clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::collector::ValidationError;
  use serde_json::json;

  #[test]
  fn test_activation() {
    let mut collector = ActionCollector::from_json(
      &json!({ "type": "SUBMIT_BUTTON", "key": "submit", "label": "Sign On" }),
      ActionKind::Submit,
    );
    assert!(collector.is_action());
    assert_eq!(collector.payload(), None);
    assert!(collector.validate().is_empty());

    collector.initialize(&json!("yes"));
    assert!(!collector.is_activated());

    collector.initialize(&json!(true));
    assert_eq!(collector.payload(), Some(json!("submit")));
  }

  #[test]
  fn test_required_without_activation() {
    let mut collector = ActionCollector::from_json(
      &json!({ "type": "SUBMIT_BUTTON", "key": "submit", "required": true }),
      ActionKind::Submit,
    );
    assert!(collector.required());
    assert_eq!(collector.validate(), vec![ValidationError::Required]);

    collector.activate();
    assert!(collector.validate().is_empty());
  }
}
