use std::sync::Arc;

use async_trait::async_trait;
use authflow_config::SessionConfig;
use authflow_http::{Method, Request};
use authflow_storage::{FileStorage, MemoryStorage, Storage};
use tracing::debug;

use crate::context::{FlowContext, SESSION_KEY, WorkflowContext};
use crate::error::WorkflowError;
use crate::module::{Configurable, Module};
use crate::node::Session;

/// Keeps the session in a credential store.
///
/// Restores a stored session into the workflow context on initialize, stores
/// the session of every successful flow, and on sign-off posts to the
/// configured endpoint and deletes the stored session.
pub struct SessionModule {
  config: SessionConfig,
  storage: Arc<dyn Storage<Session>>,
}

impl SessionModule {
  pub fn with_storage(config: SessionConfig, storage: Arc<dyn Storage<Session>>) -> Self {
    Self { config, storage }
  }

  pub fn storage(&self) -> &Arc<dyn Storage<Session>> {
    &self.storage
  }
}

impl Default for SessionModule {
  fn default() -> Self {
    Self::with_config(SessionConfig::default())
  }
}

impl Configurable for SessionModule {
  type Config = SessionConfig;

  /// File-backed storage when `storage_path` is set, in-memory otherwise.
  fn with_config(config: SessionConfig) -> Self {
    let storage: Arc<dyn Storage<Session>> = match &config.storage_path {
      Some(path) => Arc::new(FileStorage::<Session>::new(path.clone())),
      None => Arc::new(MemoryStorage::<Session>::new()),
    };
    Self { config, storage }
  }
}

impl std::fmt::Debug for SessionModule {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SessionModule")
      .field("config", &self.config)
      .finish_non_exhaustive()
  }
}

#[async_trait]
impl Module for SessionModule {
  fn name(&self) -> &str {
    "session"
  }

  async fn initialize(&self, ctx: &WorkflowContext) -> Result<(), WorkflowError> {
    if let Some(session) = self.storage.get().await? {
      debug!("session restored");
      ctx.set(SESSION_KEY, session);
    }
    Ok(())
  }

  async fn success(&self, _ctx: &FlowContext, session: Session) -> Result<Session, WorkflowError> {
    self.storage.save(session.clone()).await?;
    Ok(session)
  }

  async fn sign_off(&self, _ctx: &FlowContext, mut request: Request) -> Result<Request, WorkflowError> {
    if let Some(url) = &self.config.sign_off_url {
      request.set_method(Method::POST).set_url(url);
    }
    self.storage.delete().await?;
    Ok(request)
  }
}
