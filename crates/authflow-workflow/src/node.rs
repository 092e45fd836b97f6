//! The node model: one value per step result.

use std::fmt;
use std::sync::Arc;

use authflow_collector::Collector;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

use crate::engine::FlowRun;
use crate::error::WorkflowError;

/// Result of one flow step.
#[derive(Debug)]
pub enum Node {
  /// The server wants more input.
  Continue(ContinueNode),
  /// The flow completed with a session.
  Success(SuccessNode),
  /// The server rejected the submitted input. The previous
  /// [`ContinueNode`] can be submitted again.
  Error(ErrorNode),
  /// The flow run was torn down.
  Failure(FailureNode),
}

impl Node {
  pub(crate) fn failure(cause: WorkflowError) -> Self {
    Self::Failure(FailureNode { cause })
  }

  /// Short name used in logs and events.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Continue(_) => "continue",
      Self::Success(_) => "success",
      Self::Error(_) => "error",
      Self::Failure(_) => "failure",
    }
  }

  pub fn as_continue(&self) -> Option<&ContinueNode> {
    match self {
      Self::Continue(node) => Some(node),
      _ => None,
    }
  }

  pub fn into_continue(self) -> Option<ContinueNode> {
    match self {
      Self::Continue(node) => Some(node),
      _ => None,
    }
  }
}

/// A step waiting for input.
///
/// Collectors are built fresh for every step; the application fills them in
/// and calls [`ContinueNode::next`].
pub struct ContinueNode {
  step_id: String,
  payload: Arc<Value>,
  collectors: Vec<Box<dyn Collector>>,
  run: Arc<FlowRun>,
}

impl ContinueNode {
  pub(crate) fn new(
    step_id: String,
    payload: Arc<Value>,
    collectors: Vec<Box<dyn Collector>>,
    run: Arc<FlowRun>,
  ) -> Self {
    Self {
      step_id,
      payload,
      collectors,
      run,
    }
  }

  pub fn flow_id(&self) -> Uuid {
    self.run.flow_id()
  }

  pub fn step_id(&self) -> &str {
    &self.step_id
  }

  /// The raw step description returned by the server.
  pub fn payload(&self) -> &Value {
    &self.payload
  }

  pub fn collectors(&self) -> &[Box<dyn Collector>] {
    &self.collectors
  }

  pub fn collectors_mut(&mut self) -> &mut [Box<dyn Collector>] {
    &mut self.collectors
  }

  /// Find a collector by key.
  pub fn collector(&self, key: &str) -> Option<&dyn Collector> {
    self
      .collectors
      .iter()
      .find(|c| c.key() == key)
      .map(|c| c.as_ref())
  }

  pub fn collector_mut(&mut self, key: &str) -> Option<&mut Box<dyn Collector>> {
    self.collectors.iter_mut().find(|c| c.key() == key)
  }

  /// Assign a value to the collector with `key`. Returns `false` when no
  /// such collector exists.
  pub fn set(&mut self, key: &str, value: impl Into<Value>) -> bool {
    match self.collector_mut(key) {
      Some(collector) => {
        collector.initialize(&value.into());
        true
      }
      None => false,
    }
  }

  /// Validation errors of every collector, keyed by collector key. Only
  /// collectors with errors are listed.
  pub fn validate(&self) -> Vec<(String, Vec<authflow_collector::ValidationError>)> {
    self
      .collectors
      .iter()
      .filter_map(|c| {
        let errors = c.validate();
        (!errors.is_empty()).then(|| (c.key().to_string(), errors))
      })
      .collect()
  }

  /// The submission this node would send.
  pub fn submission(&self) -> Submission {
    Submission::from_collectors(&self.step_id, &self.collectors)
  }

  /// Submit the collected input and advance the flow.
  ///
  /// The engine does not validate; call [`ContinueNode::validate`] first.
  #[instrument(
    name = "flow_next",
    skip(self),
    fields(flow_id = %self.run.flow_id(), step_id = %self.step_id)
  )]
  pub async fn next(&self) -> Node {
    self.run.advance(Some(self.submission())).await
  }
}

impl fmt::Debug for ContinueNode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ContinueNode")
      .field("flow_id", &self.run.flow_id())
      .field("step_id", &self.step_id)
      .field("collectors", &self.collectors)
      .finish()
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuccessNode {
  pub session: Session,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorNode {
  pub message: String,
  pub status: u16,
  /// The full error body.
  pub details: Value,
}

#[derive(Debug)]
pub struct FailureNode {
  pub cause: WorkflowError,
}

/// Opaque session value produced by a successful flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session {
  value: Value,
}

impl Session {
  pub fn new(value: Value) -> Self {
    Self { value }
  }

  pub fn value(&self) -> &Value {
    &self.value
  }

  pub fn into_value(self) -> Value {
    self.value
  }

  pub fn get(&self, key: &str) -> Option<&Value> {
    self.value.get(key)
  }

  /// Add an entry to an object session. Returns `false` for non-object
  /// sessions, which are left untouched.
  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> bool {
    match self.value.as_object_mut() {
      Some(map) => {
        map.insert(key.into(), value.into());
        true
      }
      None => false,
    }
  }
}

/// One submitted name/value pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionField {
  pub name: String,
  pub value: Value,
}

/// Input collected for one step, in collector order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
  pub step_id: String,
  /// Key of the activated action collector, if any.
  pub action: Option<String>,
  pub fields: Vec<SubmissionField>,
}

impl Submission {
  /// Collect payloads. Collectors without a payload are omitted; the first
  /// action collector with a payload names the action.
  pub fn from_collectors(step_id: &str, collectors: &[Box<dyn Collector>]) -> Self {
    let mut action = None;
    let mut fields = Vec::new();

    for collector in collectors {
      let Some(value) = collector.payload() else {
        continue;
      };
      if collector.is_action() && action.is_none() {
        action = Some(collector.key().to_string());
      }
      fields.push(SubmissionField {
        name: collector.key().to_string(),
        value,
      });
    }

    Self {
      step_id: step_id.to_string(),
      action,
      fields,
    }
  }

  pub fn field(&self, name: &str) -> Option<&Value> {
    self
      .fields
      .iter()
      .find(|f| f.name == name)
      .map(|f| &f.value)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use authflow_collector::CollectorRegistry;
  use serde_json::json;

  #[test]
  fn test_submission_omits_empty_payloads() {
    let registry = CollectorRegistry::with_defaults();
    let mut collectors = registry.build(&[
      json!({ "type": "TEXT", "key": "username", "required": true, "value": "alice" }),
      json!({ "type": "TEXT", "key": "nickname" }),
      json!({ "type": "LABEL", "content": "Welcome" }),
      json!({ "type": "SUBMIT_BUTTON", "key": "submit" }),
    ]);
    collectors[3].initialize(&json!(true));

    let submission = Submission::from_collectors("step-1", &collectors);

    assert_eq!(submission.step_id, "step-1");
    assert_eq!(submission.action.as_deref(), Some("submit"));
    let names: Vec<&str> = submission.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["username", "submit"]);
    assert_eq!(submission.field("username"), Some(&json!("alice")));
  }

  #[test]
  fn test_submission_without_action() {
    let registry = CollectorRegistry::with_defaults();
    let collectors = registry.build(&[
      json!({ "type": "TEXT", "key": "username", "value": "alice" }),
      json!({ "type": "SUBMIT_BUTTON", "key": "submit" }),
    ]);

    let submission = Submission::from_collectors("s", &collectors);
    assert!(submission.action.is_none());
    assert_eq!(submission.fields.len(), 1);
  }

  #[test]
  fn test_session_insert() {
    let mut session = Session::new(json!({ "accessToken": "t" }));
    assert!(session.insert("codeVerifier", "v"));
    assert_eq!(session.get("codeVerifier"), Some(&json!("v")));

    let mut opaque = Session::new(json!("token"));
    assert!(!opaque.insert("codeVerifier", "v"));
    assert_eq!(opaque.value(), &json!("token"));
  }
}
