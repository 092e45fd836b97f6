use serde::{Deserialize, Serialize};

use crate::modules::{CookieConfig, FormsConfig, HeadersConfig, PkceConfig, SessionConfig};

pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

fn default_timeout_ms() -> u64 {
  DEFAULT_TIMEOUT_MS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDef {
  #[serde(default = "default_timeout_ms")]
  pub timeout_ms: u64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub headers: Option<HeadersConfig>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cookies: Option<CookieConfig>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub pkce: Option<PkceConfig>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub forms: Option<FormsConfig>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub session: Option<SessionConfig>,
}

impl Default for WorkflowDef {
  fn default() -> Self {
    Self {
      timeout_ms: DEFAULT_TIMEOUT_MS,
      headers: None,
      cookies: None,
      pkce: None,
      forms: None,
      session: None,
    }
  }
}

impl WorkflowDef {
  pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(json)
  }
}
