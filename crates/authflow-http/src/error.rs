//! HTTP errors.

/// Errors raised while building, sending or decoding HTTP exchanges.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
  /// The request URL (with its query) is not a valid absolute URL.
  #[error("invalid url '{url}': {message}")]
  InvalidUrl { url: String, message: String },

  /// The request has no URL; no module set one.
  #[error("request has no url")]
  MissingUrl,

  /// The HTTP client failed to send the request or read the response.
  #[error("http request failed: {0}")]
  Request(#[from] reqwest::Error),

  /// The response body is not valid JSON.
  #[error("invalid json body: {0}")]
  Json(#[from] serde_json::Error),

  /// A transport implementation failed for another reason.
  #[error("transport error: {message}")]
  Transport { message: String },
}

impl HttpError {
  pub fn transport(message: impl Into<String>) -> Self {
    Self::Transport {
      message: message.into(),
    }
  }
}
