use async_trait::async_trait;
use authflow_config::HeadersConfig;
use authflow_http::Request;

use crate::context::FlowContext;
use crate::error::WorkflowError;
use crate::module::{Configurable, Module};

/// Adds static headers to every step and sign-off request.
#[derive(Debug, Clone, Default)]
pub struct HeadersModule {
  config: HeadersConfig,
}

impl HeadersModule {
  fn apply(&self, mut request: Request) -> Request {
    for (name, value) in &self.config.values {
      request.set_header(name, value);
    }
    request
  }
}

impl Configurable for HeadersModule {
  type Config = HeadersConfig;

  fn with_config(config: HeadersConfig) -> Self {
    Self { config }
  }
}

#[async_trait]
impl Module for HeadersModule {
  fn name(&self) -> &str {
    "headers"
  }

  async fn start(&self, _ctx: &FlowContext, request: Request) -> Result<Request, WorkflowError> {
    Ok(self.apply(request))
  }

  async fn sign_off(&self, _ctx: &FlowContext, request: Request) -> Result<Request, WorkflowError> {
    Ok(self.apply(request))
  }
}
