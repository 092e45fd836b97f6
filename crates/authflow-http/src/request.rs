//! Mutable request builder passed through module `start` hooks.

use bytes::Bytes;
use reqwest::Method;
use url::Url;

use crate::error::HttpError;

/// Request body.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Body {
  #[default]
  Empty,
  Json(serde_json::Value),
  /// `application/x-www-form-urlencoded` fields, in order.
  Form(Vec<(String, String)>),
  Bytes(Bytes),
}

/// An outgoing HTTP request.
///
/// Starts empty (GET, no URL); modules fill it in step by step. Headers and
/// query parameters keep insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
  method: Method,
  url: String,
  headers: Vec<(String, String)>,
  query: Vec<(String, String)>,
  body: Body,
}

impl Default for Request {
  fn default() -> Self {
    Self {
      method: Method::GET,
      url: String::new(),
      headers: Vec::new(),
      query: Vec::new(),
      body: Body::Empty,
    }
  }
}

impl Request {
  /// Create an empty GET request.
  pub fn new() -> Self {
    Self::default()
  }

  /// Create a GET request for `url`.
  pub fn get(url: impl Into<String>) -> Self {
    let mut request = Self::new();
    request.set_url(url);
    request
  }

  /// Create a POST request for `url`.
  pub fn post(url: impl Into<String>) -> Self {
    let mut request = Self::get(url);
    request.set_method(Method::POST);
    request
  }

  pub fn method(&self) -> &Method {
    &self.method
  }

  pub fn set_method(&mut self, method: Method) -> &mut Self {
    self.method = method;
    self
  }

  /// The base URL, without query parameters.
  pub fn url(&self) -> &str {
    &self.url
  }

  /// Replace the base URL.
  pub fn set_url(&mut self, url: impl Into<String>) -> &mut Self {
    self.url = url.into();
    self
  }

  /// Whether a module has addressed the request.
  pub fn has_url(&self) -> bool {
    !self.url.is_empty()
  }

  /// Append a header. Existing headers with the same name are kept.
  pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
    self.headers.push((name.into(), value.into()));
    self
  }

  /// Set a header, replacing any existing values with the same name.
  pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
    let name = name.into();
    self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
    self.headers.push((name, value.into()));
    self
  }

  /// First value of a header, matched case-insensitively.
  pub fn header_value(&self, name: &str) -> Option<&str> {
    self
      .headers
      .iter()
      .find(|(n, _)| n.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_str())
  }

  pub fn headers(&self) -> &[(String, String)] {
    &self.headers
  }

  /// Append a query parameter.
  pub fn parameter(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
    self.query.push((name.into(), value.into()));
    self
  }

  pub fn parameters(&self) -> &[(String, String)] {
    &self.query
  }

  /// First value of a query parameter.
  pub fn parameter_value(&self, name: &str) -> Option<&str> {
    self
      .query
      .iter()
      .find(|(n, _)| n == name)
      .map(|(_, v)| v.as_str())
  }

  /// Set a JSON body and its `Content-Type`.
  pub fn json(&mut self, body: serde_json::Value) -> &mut Self {
    self.set_header("Content-Type", "application/json");
    self.body = Body::Json(body);
    self
  }

  /// Set a form-encoded body and its `Content-Type`.
  pub fn form(&mut self, fields: Vec<(String, String)>) -> &mut Self {
    self.set_header("Content-Type", "application/x-www-form-urlencoded");
    self.body = Body::Form(fields);
    self
  }

  pub fn set_body(&mut self, body: Body) -> &mut Self {
    self.body = body;
    self
  }

  pub fn body(&self) -> &Body {
    &self.body
  }

  /// The full URL including query parameters.
  pub fn resolved_url(&self) -> Result<Url, HttpError> {
    if self.url.is_empty() {
      return Err(HttpError::MissingUrl);
    }
    let mut url = Url::parse(&self.url).map_err(|e| HttpError::InvalidUrl {
      url: self.url.clone(),
      message: e.to_string(),
    })?;
    if !self.query.is_empty() {
      url.query_pairs_mut().extend_pairs(self.query.iter());
    }
    Ok(url)
  }
}
