use async_trait::async_trait;
use authflow_http::{Request, Response};

use crate::context::FlowContext;
use crate::error::WorkflowError;
use crate::module::Module;

/// Sends step requests through the workflow's [`HttpClient`](authflow_http::HttpClient).
#[derive(Debug, Clone, Copy, Default)]
pub struct TransportModule;

#[async_trait]
impl Module for TransportModule {
  fn name(&self) -> &str {
    "transport"
  }

  fn provides_transport(&self) -> bool {
    true
  }

  async fn transport(&self, ctx: &FlowContext, request: Request) -> Result<Response, WorkflowError> {
    let client = ctx
      .http_client()
      .ok_or(WorkflowError::TransportNotConfigured)?;
    Ok(client.send(request).await?)
  }
}
