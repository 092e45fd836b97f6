//! Immutable response handed to module `transform` hooks.

use bytes::Bytes;

use crate::error::HttpError;

/// A received HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
  status: u16,
  headers: Vec<(String, String)>,
  body: Bytes,
}

impl Response {
  /// Create a response from its parts.
  pub fn new(status: u16, headers: Vec<(String, String)>, body: impl Into<Bytes>) -> Self {
    Self {
      status,
      headers,
      body: body.into(),
    }
  }

  /// Build a response with a JSON body.
  pub fn json_body(status: u16, body: &serde_json::Value) -> Self {
    Self::new(
      status,
      vec![("Content-Type".to_string(), "application/json".to_string())],
      body.to_string(),
    )
  }

  pub fn status(&self) -> u16 {
    self.status
  }

  /// Whether the status is 2xx.
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }

  pub fn headers(&self) -> &[(String, String)] {
    &self.headers
  }

  /// First value of a header, matched case-insensitively.
  pub fn header(&self, name: &str) -> Option<&str> {
    self
      .headers
      .iter()
      .find(|(n, _)| n.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_str())
  }

  /// Every value of a header, e.g. multiple `Set-Cookie` lines.
  pub fn header_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    self
      .headers
      .iter()
      .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_str())
  }

  pub fn body(&self) -> &Bytes {
    &self.body
  }

  /// Body decoded as UTF-8, lossy.
  pub fn text(&self) -> String {
    String::from_utf8_lossy(&self.body).into_owned()
  }

  /// Body parsed as JSON.
  pub fn json(&self) -> Result<serde_json::Value, HttpError> {
    Ok(serde_json::from_slice(&self.body)?)
  }
}
