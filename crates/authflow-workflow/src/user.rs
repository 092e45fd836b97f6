use crate::engine::Workflow;
use crate::error::WorkflowError;
use crate::node::Session;

/// A signed-in user: the cached session plus a handle to sign it off.
#[derive(Debug, Clone)]
pub struct User {
  workflow: Workflow,
  session: Session,
}

impl User {
  pub(crate) fn new(workflow: Workflow, session: Session) -> Self {
    Self { workflow, session }
  }

  pub fn session(&self) -> &Session {
    &self.session
  }

  pub async fn sign_off(self) -> Result<(), WorkflowError> {
    self.workflow.sign_off().await
  }
}
