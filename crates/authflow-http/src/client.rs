//! Transport collaborator: sends a [`Request`] and returns a [`Response`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::HttpError;
use crate::request::{Body, Request};
use crate::response::Response;

/// Sends requests on behalf of the transport module.
#[async_trait]
pub trait HttpClient: Send + Sync {
  async fn send(&self, request: Request) -> Result<Response, HttpError>;
}

/// [`HttpClient`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
  client: Client,
}

impl ReqwestClient {
  /// Create a client whose requests give up after `timeout`.
  ///
  /// Redirects are not followed; flow servers answer with JSON and a 3xx is
  /// handed to the modules untouched.
  pub fn new(timeout: Duration) -> Result<Self, HttpError> {
    let client = Client::builder()
      .timeout(timeout)
      .redirect(reqwest::redirect::Policy::none())
      .build()?;
    Ok(Self { client })
  }

  /// Wrap an already configured reqwest client.
  pub fn with_client(client: Client) -> Self {
    Self { client }
  }
}

#[async_trait]
impl HttpClient for ReqwestClient {
  async fn send(&self, request: Request) -> Result<Response, HttpError> {
    let url = request.resolved_url()?;
    debug!(method = %request.method(), url = %url, "sending request");

    let mut builder = self.client.request(request.method().clone(), url);
    for (name, value) in request.headers() {
      builder = builder.header(name, value);
    }
    builder = match request.body() {
      Body::Empty => builder,
      Body::Json(value) => builder.body(value.to_string()),
      Body::Form(fields) => builder.form(fields),
      Body::Bytes(bytes) => builder.body(bytes.clone()),
    };

    let response = builder.send().await?;

    let status = response.status().as_u16();
    let headers: Vec<(String, String)> = response
      .headers()
      .iter()
      .filter_map(|(k, v)| {
        v.to_str()
          .ok()
          .map(|val| (k.as_str().to_string(), val.to_string()))
      })
      .collect();
    let body = response.bytes().await?;

    debug!(status, bytes = body.len(), "received response");
    Ok(Response::new(status, headers, body))
  }
}
