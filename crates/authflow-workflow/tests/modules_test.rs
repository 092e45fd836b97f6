//! Integration tests for the bundled modules.

mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use authflow_config::{CookieConfig, HeadersConfig, SessionConfig};
use authflow_http::Method;
use authflow_storage::{MemoryStorage, Storage};
use authflow_workflow::modules::{
  CookieModule, FormsModule, HeadersModule, PkceModule, SessionModule, TransportModule,
  code_challenge,
};
use authflow_workflow::{Configurable, Node, Session, Workflow};
use common::*;
use serde_json::json;

fn forms() -> FormsModule {
  FormsModule::configure(|cfg| cfg.start_url = START_URL.to_string())
}

#[tokio::test]
async fn test_cookies_replay_within_run_and_persist_by_name() {
  let client = ScriptedClient::new(vec![
    respond_with_cookies(200, login_step(), &["ST=abc; Path=/; HttpOnly", "flow=xyz"]),
    respond(200, success_body()),
    respond(200, login_step()),
  ]);
  let workflow = Workflow::builder()
    .module(CookieModule::with_config(CookieConfig {
      persist: vec!["ST".to_string()],
    }))
    .module(forms())
    .module(TransportModule)
    .http_client(client.clone())
    .build();

  let step = workflow.start().await.into_continue().expect("continue node");
  assert!(matches!(step.next().await, Node::Success(_)));
  workflow.start().await;

  let requests = client.requests();
  assert_eq!(requests[0].header_value("Cookie"), None);
  assert_eq!(requests[1].header_value("Cookie"), Some("ST=abc; flow=xyz"));
  assert_eq!(requests[2].header_value("Cookie"), Some("ST=abc"));
}

#[tokio::test]
async fn test_failed_run_does_not_persist_cookies() {
  let client = ScriptedClient::new(vec![
    respond_with_cookies(200, login_step(), &["ST=abc"]),
    respond(500, json!({ "message": "boom" })),
    respond(200, login_step()),
  ]);
  let workflow = Workflow::builder()
    .module(CookieModule::configure(|cfg| cfg.persist.push("ST".to_string())))
    .module(forms())
    .module(TransportModule)
    .http_client(client.clone())
    .build();

  let step = workflow.start().await.into_continue().expect("continue node");
  assert!(matches!(step.next().await, Node::Failure(_)));
  workflow.start().await;

  assert_eq!(client.requests()[2].header_value("Cookie"), None);
}

#[tokio::test]
async fn test_pkce_challenge_on_first_request_and_verifier_on_session() {
  let client = ScriptedClient::new(vec![
    respond(200, login_step()),
    respond(200, success_body()),
  ]);
  let workflow = Workflow::builder()
    .module(PkceModule::default())
    .module(forms())
    .module(TransportModule)
    .http_client(client.clone())
    .build();

  let step = workflow.start().await.into_continue().expect("continue node");
  let node = step.next().await;
  let Node::Success(success) = node else {
    panic!("expected success node, got {node:?}");
  };

  let requests = client.requests();
  let challenge = requests[0]
    .parameter_value("code_challenge")
    .expect("challenge parameter");
  assert_eq!(
    requests[0].parameter_value("code_challenge_method"),
    Some("S256")
  );
  assert_eq!(requests[1].parameter_value("code_challenge"), None);

  let verifier = success
    .session
    .get("codeVerifier")
    .and_then(|v| v.as_str())
    .expect("verifier on session");
  assert_eq!(code_challenge(verifier), challenge);
  assert_eq!(success.session.get("accessToken"), Some(&json!("at-123")));
}

#[tokio::test]
async fn test_headers_apply_to_every_request() {
  let client = ScriptedClient::new(vec![
    respond(200, login_step()),
    respond(200, success_body()),
  ]);
  let workflow = Workflow::builder()
    .module(HeadersModule::with_config(HeadersConfig {
      values: BTreeMap::from([("X-Client".to_string(), "mobile".to_string())]),
    }))
    .module(forms())
    .module(TransportModule)
    .http_client(client.clone())
    .build();

  let step = workflow.start().await.into_continue().expect("continue node");
  step.next().await;

  for request in client.requests() {
    assert_eq!(request.header_value("X-Client"), Some("mobile"));
  }
}

fn session_workflow(client: Arc<ScriptedClient>, storage: Arc<MemoryStorage<Session>>) -> Workflow {
  let config = SessionConfig {
    sign_off_url: Some(SIGN_OFF_URL.to_string()),
    storage_path: None,
  };
  Workflow::builder()
    .module(forms())
    .module(SessionModule::with_storage(config, storage))
    .module(TransportModule)
    .http_client(client)
    .build()
}

#[tokio::test]
async fn test_session_is_persisted_and_signed_off() {
  let storage = Arc::new(MemoryStorage::new());
  let client = ScriptedClient::new(vec![
    respond(200, success_body()),
    respond(200, json!({})),
  ]);
  let workflow = session_workflow(client.clone(), storage.clone());

  assert!(matches!(workflow.start().await, Node::Success(_)));
  let stored = storage.get().await.unwrap().expect("stored session");
  assert_eq!(stored.get("user"), Some(&json!("alice")));

  let user = workflow.user().await.expect("signed-in user");
  assert_eq!(user.session(), &stored);
  user.sign_off().await.unwrap();

  let requests = client.requests();
  assert_eq!(requests.len(), 2);
  assert_eq!(requests[1].method(), &Method::POST);
  assert_eq!(requests[1].url(), SIGN_OFF_URL);
  assert!(storage.get().await.unwrap().is_none());
  assert!(workflow.user().await.is_none());
}

#[tokio::test]
async fn test_stored_session_is_restored_on_initialize() {
  let storage = Arc::new(MemoryStorage::new());
  storage
    .save(Session::new(json!({ "accessToken": "restored" })))
    .await
    .unwrap();
  let client = ScriptedClient::new(Vec::new());
  let workflow = session_workflow(client.clone(), storage);

  let session = workflow.session().await.expect("restored session");

  assert_eq!(session.get("accessToken"), Some(&json!("restored")));
  assert!(client.requests().is_empty());
}

#[tokio::test]
async fn test_sign_off_without_endpoint_sends_nothing() {
  let client = ScriptedClient::new(vec![respond(200, success_body())]);
  let workflow = Workflow::builder()
    .module(forms())
    .module(SessionModule::default())
    .module(TransportModule)
    .http_client(client.clone())
    .build();

  workflow.start().await;
  workflow.sign_off().await.unwrap();

  assert_eq!(client.requests().len(), 1);
  assert!(workflow.session().await.is_none());
}
