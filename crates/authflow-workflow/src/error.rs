//! Workflow error types.

use authflow_http::HttpError;
use authflow_storage::StorageError;

/// Unrecoverable faults raised while driving a flow.
///
/// The engine never returns these from `start`/`next`; they are caught once at
/// the step boundary and surfaced as `Node::Failure`.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
  /// No module offers a transport hook.
  #[error("no module provides a transport")]
  TransportNotConfigured,

  /// The network call failed.
  #[error("transport failed: {0}")]
  Transport(#[from] HttpError),

  /// The network call did not finish within the configured timeout.
  #[error("transport timed out after {after_ms}ms")]
  Timeout { after_ms: u64 },

  /// The flow run was cancelled by the caller.
  #[error("flow cancelled")]
  Cancelled,

  /// No module could turn the response into a node.
  #[error("unhandled response with status {status}")]
  UnhandledResponse { status: u16 },

  /// Another step of the same flow run is still in progress.
  #[error("a step is already in progress for this flow")]
  FlowBusy,

  /// The flow run already reached a terminal node.
  #[error("flow has already finished")]
  FlowClosed,

  /// Session storage failed.
  #[error("storage failed: {0}")]
  Storage(#[from] StorageError),

  /// A module hook failed.
  #[error("module '{module}' failed: {message}")]
  Module { module: String, message: String },

  /// The workflow was assembled with an invalid configuration.
  #[error("invalid configuration: {message}")]
  Config { message: String },
}

impl WorkflowError {
  pub fn module(module: impl Into<String>, message: impl Into<String>) -> Self {
    Self::Module {
      module: module.into(),
      message: message.into(),
    }
  }

  pub fn config(message: impl Into<String>) -> Self {
    Self::Config {
      message: message.into(),
    }
  }
}
