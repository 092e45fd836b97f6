//! Authflow Workflow Engine
//!
//! Drives a server-led authentication flow one step at a time. A [`Workflow`]
//! is an ordered list of [`Module`]s; each step runs their hooks in order:
//!
//! ```text
//! initialize (once per workflow)
//!   └─ start ─▶ transport ─▶ transform ─┬─▶ Continue  (collectors built, wait for next())
//!                                       ├─▶ Error     (recoverable, resubmit the same node)
//!                                       ├─▶ Success ─▶ success hooks ─▶ session cached
//!                                       └─▶ Failure   (run torn down)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let workflow = Workflow::builder()
//!   .module(FormsModule::configure(|cfg| {
//!     cfg.start_url = "https://auth.example.com/flows/login".into();
//!   }))
//!   .module(TransportModule)
//!   .http_client(Arc::new(ReqwestClient::new(Duration::from_secs(15))?))
//!   .build();
//!
//! let mut node = workflow.start().await;
//! while let Node::Continue(mut step) = node {
//!   step.set("username", "alice");
//!   node = step.next().await;
//! }
//! ```

mod context;
mod def;
mod engine;
mod error;
mod events;
mod module;
pub mod modules;
mod node;
mod user;

pub use context::{FlowContext, SESSION_KEY, SUBMISSION_KEY, WorkflowContext};
pub use engine::{DEFAULT_TIMEOUT, Workflow, WorkflowBuilder, WorkflowConfig};
pub use error::WorkflowError;
pub use events::{ChannelNotifier, FlowEvent, FlowNotifier, NoopNotifier};
pub use module::{Configurable, Module, Outcome};
pub use node::{
  ContinueNode, ErrorNode, FailureNode, Node, Session, Submission, SubmissionField, SuccessNode,
};
pub use user::User;
