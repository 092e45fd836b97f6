//! Proof Key for Code Exchange (RFC 7636, S256 only).

use async_trait::async_trait;
use authflow_config::PkceConfig;
use authflow_http::Request;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::context::FlowContext;
use crate::error::WorkflowError;
use crate::module::{Configurable, Module};
use crate::node::Session;

/// Flow-context key holding the run's code verifier.
pub const VERIFIER_KEY: &str = "authflow.pkce.verifier";

/// 32 random bytes, base64url encoded (43 characters).
pub fn generate_verifier() -> String {
  let mut bytes = [0u8; 32];
  rand::rng().fill(&mut bytes);
  URL_SAFE_NO_PAD.encode(bytes)
}

pub fn code_challenge(verifier: &str) -> String {
  URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Adds a code challenge to the first request of every run and hands the
/// verifier to the session on success (as `codeVerifier`).
#[derive(Debug, Clone, Default)]
pub struct PkceModule {
  config: PkceConfig,
}

impl Configurable for PkceModule {
  type Config = PkceConfig;

  fn with_config(config: PkceConfig) -> Self {
    Self { config }
  }
}

#[async_trait]
impl Module for PkceModule {
  fn name(&self) -> &str {
    "pkce"
  }

  async fn start(&self, ctx: &FlowContext, mut request: Request) -> Result<Request, WorkflowError> {
    if ctx.submission().is_some() {
      return Ok(request);
    }
    let verifier = generate_verifier();
    request
      .parameter(&self.config.challenge_param, code_challenge(&verifier))
      .parameter(&self.config.method_param, "S256");
    ctx.set(VERIFIER_KEY, verifier);
    Ok(request)
  }

  async fn success(&self, ctx: &FlowContext, mut session: Session) -> Result<Session, WorkflowError> {
    if let Some(verifier) = ctx.get::<String>(VERIFIER_KEY) {
      if !session.insert("codeVerifier", verifier) {
        debug!("session is not an object, code verifier dropped");
      }
    }
    Ok(session)
  }
}
