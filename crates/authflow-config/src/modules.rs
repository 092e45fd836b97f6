use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::enums::HttpMethod;

/// Static headers added to every request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadersConfig {
  #[serde(default)]
  pub values: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CookieConfig {
  /// Cookie names kept across flow runs. Every other cookie lives only for
  /// the run that received it.
  #[serde(default)]
  pub persist: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PkceConfig {
  /// Query parameter carrying the code challenge.
  #[serde(default = "default_challenge_param")]
  pub challenge_param: String,
  #[serde(default = "default_method_param")]
  pub method_param: String,
}

impl Default for PkceConfig {
  fn default() -> Self {
    Self {
      challenge_param: default_challenge_param(),
      method_param: default_method_param(),
    }
  }
}

fn default_challenge_param() -> String {
  "code_challenge".to_string()
}

fn default_method_param() -> String {
  "code_challenge_method".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormsConfig {
  pub start_url: String,
  #[serde(default)]
  pub start_method: HttpMethod,
  #[serde(default)]
  pub parameters: BTreeMap<String, String>,
}

impl Default for FormsConfig {
  fn default() -> Self {
    Self {
      start_url: String::new(),
      start_method: HttpMethod::Get,
      parameters: BTreeMap::new(),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sign_off_url: Option<String>,
  /// File the session is persisted to. Sessions are kept in memory when
  /// absent.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub storage_path: Option<PathBuf>,
}
