//! JSON form step protocol.
//!
//! The first request goes to the configured start URL. A step response
//! carries its fields (top-level `fields`, or `form.fields`) and a link to
//! post the next submission to (`_links.next.href`, else
//! `_links.continue.href`). A response with a `session` object ends the flow;
//! a 4xx with a `message` is a recoverable error.

use async_trait::async_trait;
use authflow_config::{FormsConfig, HttpMethod};
use authflow_http::{Method, Request, Response};
use serde_json::{Value, json};

use crate::context::FlowContext;
use crate::error::WorkflowError;
use crate::module::{Configurable, Module, Outcome};
use crate::node::{Session, Submission};

/// Flow-context key holding the URL the next submission is posted to.
pub const NEXT_URL_KEY: &str = "authflow.forms.next_url";

const NAME: &str = "forms";

#[derive(Debug, Clone, Default)]
pub struct FormsModule {
  config: FormsConfig,
}

impl Configurable for FormsModule {
  type Config = FormsConfig;

  fn with_config(config: FormsConfig) -> Self {
    Self { config }
  }
}

fn method(method: HttpMethod) -> Method {
  match method {
    HttpMethod::Get => Method::GET,
    HttpMethod::Post => Method::POST,
  }
}

fn submission_body(submission: &Submission) -> Value {
  json!({
    "id": submission.step_id,
    "action": submission.action,
    "input": submission.fields,
  })
}

fn next_link(body: &Value) -> Option<String> {
  body
    .pointer("/_links/next/href")
    .or_else(|| body.pointer("/_links/continue/href"))
    .and_then(Value::as_str)
    .map(str::to_string)
}

#[async_trait]
impl Module for FormsModule {
  fn name(&self) -> &str {
    NAME
  }

  async fn start(&self, ctx: &FlowContext, mut request: Request) -> Result<Request, WorkflowError> {
    request.set_header("Accept", "application/json");
    match ctx.submission() {
      None => {
        if self.config.start_url.is_empty() {
          return Err(WorkflowError::config("forms start_url is not set"));
        }
        request
          .set_method(method(self.config.start_method))
          .set_url(&self.config.start_url);
        for (name, value) in &self.config.parameters {
          request.parameter(name, value);
        }
      }
      Some(submission) => {
        let url = ctx
          .get::<String>(NEXT_URL_KEY)
          .ok_or_else(|| WorkflowError::module(NAME, "step has no next link"))?;
        request
          .set_method(Method::POST)
          .set_url(url)
          .json(submission_body(&submission));
      }
    }
    Ok(request)
  }

  async fn transform(
    &self,
    ctx: &FlowContext,
    response: &Response,
  ) -> Result<Option<Outcome>, WorkflowError> {
    let Ok(body) = response.json() else {
      return Ok(None);
    };

    if !response.is_success() {
      let status = response.status();
      let message = body.get("message").and_then(Value::as_str);
      return Ok(match message {
        Some(message) if (400..500).contains(&status) => Some(Outcome::Error {
          message: message.to_string(),
          status,
          details: body.clone(),
        }),
        _ => None,
      });
    }

    if let Some(session) = body.get("session").filter(|s| s.is_object()) {
      return Ok(Some(Outcome::Success(Session::new(session.clone()))));
    }

    let Some(fields) = body
      .get("fields")
      .or_else(|| body.pointer("/form/fields"))
      .and_then(Value::as_array)
      .cloned()
    else {
      return Ok(None);
    };

    match next_link(&body) {
      Some(url) => ctx.set(NEXT_URL_KEY, url),
      None => {
        ctx.remove(NEXT_URL_KEY);
      }
    }

    let step_id = body
      .get("id")
      .and_then(Value::as_str)
      .unwrap_or_default()
      .to_string();
    Ok(Some(Outcome::Continue {
      step_id,
      fields,
      payload: body,
    }))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::node::SubmissionField;

  #[test]
  fn test_next_link_prefers_next() {
    let body = json!({
      "_links": {
        "continue": { "href": "https://a/continue" },
        "next": { "href": "https://a/next" }
      }
    });
    assert_eq!(next_link(&body).as_deref(), Some("https://a/next"));

    let body = json!({ "_links": { "continue": { "href": "https://a/continue" } } });
    assert_eq!(next_link(&body).as_deref(), Some("https://a/continue"));
    assert_eq!(next_link(&json!({})), None);
  }

  #[test]
  fn test_submission_body() {
    let submission = Submission {
      step_id: "login".to_string(),
      action: Some("submit".to_string()),
      fields: vec![SubmissionField {
        name: "username".to_string(),
        value: json!("alice"),
      }],
    };
    assert_eq!(
      submission_body(&submission),
      json!({
        "id": "login",
        "action": "submit",
        "input": [{ "name": "username", "value": "alice" }]
      })
    );
  }
}
