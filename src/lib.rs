//! Authflow
//!
//! Server-driven authentication flows. The server decides step by step what
//! it needs; the client represents each step as a [`Node`], lets the
//! application fill in typed collectors, and submits until a session (or an
//! unrecoverable failure) comes back.
//!
//! This crate re-exports the workspace:
//!
//! - [`kv`]: flow- and workflow-scoped key-value contexts
//! - [`http`]: request/response model and the transport collaborator
//! - [`storage`]: credential store collaborator
//! - [`collector`]: collectors and the collector registry
//! - [`policy`]: policy evaluation
//! - [`config`]: serializable workflow definitions
//! - [`workflow`]: the engine and its bundled modules

pub use authflow_collector as collector;
pub use authflow_config as config;
pub use authflow_http as http;
pub use authflow_kv as kv;
pub use authflow_policy as policy;
pub use authflow_storage as storage;
pub use authflow_workflow as workflow;

pub use authflow_collector::{Collector, CollectorRegistry, ValidationError};
pub use authflow_policy::{MfaPolicyResult, Policy, PolicyEvaluator};
pub use authflow_workflow::{
  ContinueNode, ErrorNode, FailureNode, Module, Node, Session, SuccessNode, User, Workflow,
  WorkflowConfig, WorkflowError,
};

#[cfg(test)]
mod tests {
  //! A step carrying policy configuration, gated on the client before the
  //! step is submitted.

  use std::sync::{Arc, Mutex};

  use async_trait::async_trait;
  use serde_json::{Value, json};

  use super::*;
  use crate::http::{HttpClient, HttpError, Request, Response};
  use crate::policy::{FnPolicy, PolicyError};
  use crate::workflow::Configurable;
  use crate::workflow::modules::{FormsModule, TransportModule};

  struct OneShot(Mutex<Option<Response>>);

  #[async_trait]
  impl HttpClient for OneShot {
    async fn send(&self, _request: Request) -> Result<Response, HttpError> {
      self
        .0
        .lock()
        .unwrap()
        .take()
        .ok_or_else(|| HttpError::transport("no more responses"))
    }
  }

  #[tokio::test]
  async fn test_step_policies_are_evaluated_from_payload() {
    let step = json!({
      "id": "register-device",
      "fields": [{ "type": "SUBMIT_BUTTON", "key": "register" }],
      "policies": {
        "deviceTampering": { "score": 0.5 },
        "unknownPolicy": {}
      },
      "_links": { "next": { "href": "https://auth.example.com/next" } }
    });
    let client = Arc::new(OneShot(Mutex::new(Some(Response::json_body(200, &step)))));
    let workflow = Workflow::builder()
      .module(FormsModule::configure(|cfg| {
        cfg.start_url = "https://auth.example.com/start".to_string();
      }))
      .module(TransportModule)
      .http_client(client)
      .build();

    let node = workflow.start().await;
    let Node::Continue(step) = node else {
      panic!("expected continue node, got {node:?}");
    };

    let tampering: Arc<dyn Policy> = Arc::new(FnPolicy::new("deviceTampering", |config: &Value| {
      let threshold = config
        .get("score")
        .and_then(Value::as_f64)
        .ok_or_else(|| PolicyError::invalid_config("deviceTampering", "missing score"))?;
      Ok(0.9 < threshold)
    }));
    let evaluator = PolicyEvaluator::new(vec![tampering]);

    let result = evaluator.evaluate(step.payload().get("policies")).await;

    assert_eq!(
      result,
      MfaPolicyResult::NonCompliant {
        policy: "deviceTampering".to_string()
      }
    );
  }
}
