//! Flow- and workflow-scoped contexts handed to module hooks.

use std::ops::Deref;
use std::sync::Arc;

use authflow_http::HttpClient;
use authflow_kv::Context;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::node::{Session, Submission};

/// Workflow-context key holding the current [`Session`].
pub const SESSION_KEY: &str = "authflow.session";

/// Flow-context key holding the [`Submission`] of the step in progress.
pub const SUBMISSION_KEY: &str = "authflow.submission";

/// Context that lives as long as the workflow instance.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct WorkflowContext {
  inner: Arc<Context>,
}

impl WorkflowContext {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn session(&self) -> Option<Session> {
    self.inner.get(SESSION_KEY)
  }
}

impl Deref for WorkflowContext {
  type Target = Context;

  fn deref(&self) -> &Context {
    &self.inner
  }
}

/// Context scoped to one flow run.
///
/// Dereferences to the run's own key-value map; the workflow-wide map is
/// reachable through [`FlowContext::shared`]. Cleared when the run reaches a
/// terminal node.
pub struct FlowContext {
  flow_id: Uuid,
  values: Context,
  shared: WorkflowContext,
  http_client: Option<Arc<dyn HttpClient>>,
  cancel: CancellationToken,
}

impl FlowContext {
  pub(crate) fn new(
    shared: WorkflowContext,
    http_client: Option<Arc<dyn HttpClient>>,
    cancel: CancellationToken,
  ) -> Self {
    Self {
      flow_id: Uuid::new_v4(),
      values: Context::new(),
      shared,
      http_client,
      cancel,
    }
  }

  pub fn flow_id(&self) -> Uuid {
    self.flow_id
  }

  pub fn shared(&self) -> &WorkflowContext {
    &self.shared
  }

  /// The engine's transport collaborator, if one was configured.
  pub fn http_client(&self) -> Option<&Arc<dyn HttpClient>> {
    self.http_client.as_ref()
  }

  pub fn cancel_token(&self) -> &CancellationToken {
    &self.cancel
  }

  /// The submission being sent by the current step.
  ///
  /// `None` on the first step of a run.
  pub fn submission(&self) -> Option<Submission> {
    self.values.get(SUBMISSION_KEY)
  }

  pub(crate) fn discard(&self) {
    self.values.clear();
    self.cancel.cancel();
  }
}

impl Deref for FlowContext {
  type Target = Context;

  fn deref(&self) -> &Context {
    &self.values
  }
}

impl std::fmt::Debug for FlowContext {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FlowContext")
      .field("flow_id", &self.flow_id)
      .field("values", &self.values)
      .field("shared", &self.shared)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_flow_and_shared_scopes_are_separate() {
    let shared = WorkflowContext::new();
    let flow = FlowContext::new(shared.clone(), None, CancellationToken::new());

    flow.set("verifier", "abc".to_string());
    flow.shared().set("cookie", "ST=1".to_string());

    assert_eq!(flow.get::<String>("verifier").as_deref(), Some("abc"));
    assert!(!shared.contains("verifier"));
    assert_eq!(shared.get::<String>("cookie").as_deref(), Some("ST=1"));
  }

  #[test]
  fn test_discard_clears_values_and_cancels() {
    let shared = WorkflowContext::new();
    let flow = FlowContext::new(shared.clone(), None, CancellationToken::new());
    flow.set("k", 1u32);
    shared.set("kept", 2u32);

    flow.discard();

    assert!(flow.is_empty());
    assert!(flow.cancel_token().is_cancelled());
    assert_eq!(shared.get::<u32>("kept"), Some(2));
  }
}
