//! Scripted transport shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use authflow_http::{HttpClient, HttpError, Request, Response};
use serde_json::{Value, json};
use tokio::sync::Notify;

pub const START_URL: &str = "https://auth.example.com/flows/login";
pub const NEXT_URL: &str = "https://auth.example.com/flows/1/next";
pub const SIGN_OFF_URL: &str = "https://auth.example.com/signoff";

pub enum Scripted {
  Respond(Response),
  /// Respond once the gate is notified.
  Gated(Arc<Notify>, Response),
  /// Never respond.
  Hang,
}

/// Answers requests from a queue and records every request it receives.
#[derive(Default)]
pub struct ScriptedClient {
  script: Mutex<VecDeque<Scripted>>,
  requests: Mutex<Vec<Request>>,
}

impl ScriptedClient {
  pub fn new(script: Vec<Scripted>) -> Arc<Self> {
    Arc::new(Self {
      script: Mutex::new(script.into()),
      requests: Mutex::new(Vec::new()),
    })
  }

  pub fn push(&self, scripted: Scripted) {
    self.script.lock().unwrap().push_back(scripted);
  }

  pub fn requests(&self) -> Vec<Request> {
    self.requests.lock().unwrap().clone()
  }
}

#[async_trait]
impl HttpClient for ScriptedClient {
  async fn send(&self, request: Request) -> Result<Response, HttpError> {
    self.requests.lock().unwrap().push(request);
    let next = self.script.lock().unwrap().pop_front();
    match next {
      Some(Scripted::Respond(response)) => Ok(response),
      Some(Scripted::Gated(gate, response)) => {
        gate.notified().await;
        Ok(response)
      }
      Some(Scripted::Hang) => {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(HttpError::transport("hung request woke up"))
      }
      None => Err(HttpError::transport("script exhausted")),
    }
  }
}

pub fn respond(status: u16, body: Value) -> Scripted {
  Scripted::Respond(Response::json_body(status, &body))
}

pub fn respond_with_cookies(status: u16, body: Value, cookies: &[&str]) -> Scripted {
  let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
  for cookie in cookies {
    headers.push(("Set-Cookie".to_string(), cookie.to_string()));
  }
  Scripted::Respond(Response::new(status, headers, body.to_string()))
}

/// A username/password step posting to [`NEXT_URL`].
pub fn login_step() -> Value {
  json!({
    "id": "login",
    "form": {
      "fields": [
        { "type": "TEXT", "key": "username", "label": "Username", "required": true },
        { "type": "PASSWORD", "key": "password", "label": "Password", "required": true },
        { "type": "SUBMIT_BUTTON", "key": "submit", "label": "Sign On" }
      ]
    },
    "_links": { "next": { "href": NEXT_URL } }
  })
}

pub fn success_body() -> Value {
  json!({ "session": { "accessToken": "at-123", "user": "alice" } })
}
