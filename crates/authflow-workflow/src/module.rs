//! The module contract.
//!
//! A module is a named bundle of lifecycle hooks. Every hook has a no-op
//! default so a module only implements the stages it cares about. Hooks run
//! in the order modules were registered with the workflow.

use async_trait::async_trait;
use authflow_http::{Request, Response};
use serde_json::Value;

use crate::context::{FlowContext, WorkflowContext};
use crate::error::WorkflowError;
use crate::node::Session;

/// What a `transform` hook makes of a response.
#[derive(Debug)]
pub enum Outcome {
  /// Another step is required. `fields` are the field descriptions the
  /// collectors are built from; `payload` is the whole step description.
  Continue {
    step_id: String,
    fields: Vec<Value>,
    payload: Value,
  },
  Success(Session),
  /// Recoverable rejection of the submitted input.
  Error {
    message: String,
    status: u16,
    details: Value,
  },
  Failure(WorkflowError),
}

#[async_trait]
pub trait Module: Send + Sync {
  fn name(&self) -> &str;

  /// Called once per workflow instance, before its first step.
  async fn initialize(&self, _ctx: &WorkflowContext) -> Result<(), WorkflowError> {
    Ok(())
  }

  /// Shape the outgoing request of a step. May mutate or replace it.
  async fn start(&self, _ctx: &FlowContext, request: Request) -> Result<Request, WorkflowError> {
    Ok(request)
  }

  /// Whether this module owns the network call.
  fn provides_transport(&self) -> bool {
    false
  }

  async fn transport(
    &self,
    _ctx: &FlowContext,
    _request: Request,
  ) -> Result<Response, WorkflowError> {
    Err(WorkflowError::TransportNotConfigured)
  }

  /// Turn a response into an outcome, or pass with `None`.
  async fn transform(
    &self,
    _ctx: &FlowContext,
    _response: &Response,
  ) -> Result<Option<Outcome>, WorkflowError> {
    Ok(None)
  }

  /// Enrich or replace the session of a successful flow.
  async fn success(&self, _ctx: &FlowContext, session: Session) -> Result<Session, WorkflowError> {
    Ok(session)
  }

  /// Shape the sign-off request. The request is only sent if some module
  /// gives it a URL.
  async fn sign_off(&self, _ctx: &FlowContext, request: Request) -> Result<Request, WorkflowError> {
    Ok(request)
  }
}

/// Modules built from a config factory.
///
/// ```ignore
/// let forms = FormsModule::configure(|cfg| {
///   cfg.start_url = "https://auth.example.com/flows/login".into();
/// });
/// ```
pub trait Configurable: Sized {
  type Config: Default;

  fn with_config(config: Self::Config) -> Self;

  fn configure(f: impl FnOnce(&mut Self::Config)) -> Self {
    let mut config = Self::Config::default();
    f(&mut config);
    Self::with_config(config)
  }
}
