//! Assemble a workflow from its serialized definition.

use std::sync::Arc;
use std::time::Duration;

use authflow_config::WorkflowDef;
use authflow_http::ReqwestClient;

use crate::engine::Workflow;
use crate::error::WorkflowError;
use crate::module::Configurable;
use crate::modules::{
  CookieModule, FormsModule, HeadersModule, PkceModule, SessionModule, TransportModule,
};

impl Workflow {
  /// Build a workflow from a definition. Configured modules are installed in
  /// the order headers, cookies, pkce, forms, session, followed by the
  /// transport over a reqwest client.
  pub fn from_def(def: &WorkflowDef) -> Result<Self, WorkflowError> {
    let timeout = Duration::from_millis(def.timeout_ms);
    let client = ReqwestClient::new(timeout)?;

    let mut builder = Workflow::builder()
      .http_client(Arc::new(client))
      .timeout(timeout);
    if let Some(config) = &def.headers {
      builder = builder.module(HeadersModule::with_config(config.clone()));
    }
    if let Some(config) = &def.cookies {
      builder = builder.module(CookieModule::with_config(config.clone()));
    }
    if let Some(config) = &def.pkce {
      builder = builder.module(PkceModule::with_config(config.clone()));
    }
    if let Some(config) = &def.forms {
      builder = builder.module(FormsModule::with_config(config.clone()));
    }
    if let Some(config) = &def.session {
      builder = builder.module(SessionModule::with_config(config.clone()));
    }

    Ok(builder.module(TransportModule).build())
  }

  pub fn from_json(json: &str) -> Result<Self, WorkflowError> {
    let def = WorkflowDef::from_json(json).map_err(|e| WorkflowError::config(e.to_string()))?;
    Self::from_def(&def)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_from_json_installs_configured_modules() {
    let workflow = Workflow::from_json(
      r#"{
        "timeout_ms": 2000,
        "cookies": { "persist": ["ST"] },
        "forms": { "start_url": "https://auth.example.com/start" },
        "session": {}
      }"#,
    )
    .unwrap();

    let modules: Vec<&str> = workflow.modules().collect();
    assert_eq!(modules, vec!["cookie", "forms", "session", "transport"]);
    assert_eq!(workflow.config().timeout, Duration::from_secs(2));
  }

  #[test]
  fn test_from_json_rejects_bad_definition() {
    let err = Workflow::from_json(r#"{ "forms": { "start_method": "GET" } }"#).unwrap_err();
    assert!(matches!(err, WorkflowError::Config { .. }));
  }
}
