//! Flow events and notifiers for observability.
//!
//! Events mirror the `tracing` lifecycle log lines and let an application
//! observe flows without installing a subscriber.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Events emitted while a workflow runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FlowEvent {
  /// A flow run has started.
  FlowStarted { flow_id: String },

  /// A step request is about to be built and sent.
  StepStarted { flow_id: String, step: usize },

  /// A step produced a non-terminal node (`continue` or `error`).
  StepCompleted {
    flow_id: String,
    step: usize,
    node: String,
  },

  /// The flow produced a session.
  FlowSucceeded { flow_id: String },

  /// The flow was torn down by an unrecoverable fault.
  FlowFailed { flow_id: String, error: String },

  /// The workflow's session was signed off.
  SignedOff,
}

/// Receives flow events.
///
/// Called inline from the engine; implementations must not block.
pub trait FlowNotifier: Send + Sync {
  fn notify(&self, event: FlowEvent);
}

/// Discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl FlowNotifier for NoopNotifier {
  fn notify(&self, _event: FlowEvent) {}
}

/// Forwards events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  // NOTE: unbounded so a slow consumer never stalls a flow step. Volume is a
  // handful of events per step.
  sender: mpsc::UnboundedSender<FlowEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<FlowEvent>) -> Self {
    Self { sender }
  }
}

impl FlowNotifier for ChannelNotifier {
  fn notify(&self, event: FlowEvent) {
    // Receiver may have been dropped
    let _ = self.sender.send(event);
  }
}
