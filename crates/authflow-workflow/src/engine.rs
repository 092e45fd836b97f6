//! Workflow engine.
//!
//! A [`Workflow`] composes an ordered list of modules and drives flow runs
//! through them. Each run is a [`FlowRun`] shared by the nodes it produces;
//! the run owns the flow context and the single-step guard.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use authflow_collector::{CollectorRegistry, StepBinding};
use authflow_http::{HttpClient, Request, Response};
use tokio::sync::{Mutex, OnceCell};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::context::{FlowContext, SESSION_KEY, SUBMISSION_KEY, WorkflowContext};
use crate::error::WorkflowError;
use crate::events::{FlowEvent, FlowNotifier, NoopNotifier};
use crate::module::{Module, Outcome};
use crate::node::{ContinueNode, ErrorNode, Node, Session, Submission, SuccessNode};
use crate::user::User;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Runtime knobs of a workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
  /// Upper bound for one transport call.
  pub timeout: Duration,
}

impl Default for WorkflowConfig {
  fn default() -> Self {
    Self {
      timeout: DEFAULT_TIMEOUT,
    }
  }
}

struct EngineInner {
  modules: Vec<Arc<dyn Module>>,
  http_client: Option<Arc<dyn HttpClient>>,
  registry: Arc<CollectorRegistry>,
  notifier: Arc<dyn FlowNotifier>,
  config: WorkflowConfig,
  context: WorkflowContext,
  /// One cell per module, in module order.
  initialized: Vec<OnceCell<()>>,
  cancel: CancellationToken,
}

impl EngineInner {
  /// Run each module's `initialize` at most once per engine, in module
  /// order. A failure stops the pass; the next caller resumes at the failed
  /// module and skips the ones that already succeeded.
  async fn ensure_initialized(&self) -> Result<(), WorkflowError> {
    for (module, cell) in self.modules.iter().zip(&self.initialized) {
      cell
        .get_or_try_init(|| async {
          debug!(module = %module.name(), "initializing module");
          module.initialize(&self.context).await
        })
        .await?;
    }
    Ok(())
  }

  fn new_flow_context(&self) -> FlowContext {
    FlowContext::new(
      self.context.clone(),
      self.http_client.clone(),
      self.cancel.child_token(),
    )
  }

  /// Hand the request to the first transport module, racing the run's
  /// cancellation token and the configured timeout.
  async fn send(&self, ctx: &FlowContext, request: Request) -> Result<Response, WorkflowError> {
    let transport = self
      .modules
      .iter()
      .find(|m| m.provides_transport())
      .ok_or(WorkflowError::TransportNotConfigured)?;

    let timeout = self.config.timeout;
    tokio::select! {
      _ = ctx.cancel_token().cancelled() => Err(WorkflowError::Cancelled),
      result = tokio::time::timeout(timeout, transport.transport(ctx, request)) => match result {
        Ok(response) => response,
        Err(_) => Err(WorkflowError::Timeout {
          after_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }),
      },
    }
  }
}

/// One flow run, from `start()` to a terminal node.
pub(crate) struct FlowRun {
  engine: Arc<EngineInner>,
  context: FlowContext,
  step_lock: Mutex<()>,
  closed: AtomicBool,
  steps: AtomicUsize,
}

impl FlowRun {
  fn new(engine: Arc<EngineInner>) -> Self {
    let context = engine.new_flow_context();
    Self {
      engine,
      context,
      step_lock: Mutex::new(()),
      closed: AtomicBool::new(false),
      steps: AtomicUsize::new(0),
    }
  }

  pub(crate) fn flow_id(&self) -> Uuid {
    self.context.flow_id()
  }

  /// Run one step. A second caller while a step is in flight gets
  /// `FlowBusy`; the in-flight step is not disturbed.
  pub(crate) async fn advance(self: &Arc<Self>, submission: Option<Submission>) -> Node {
    let flow_id = self.flow_id();
    let Ok(_guard) = self.step_lock.try_lock() else {
      warn!(flow_id = %flow_id, "flow_busy");
      return Node::failure(WorkflowError::FlowBusy);
    };
    if self.closed.load(Ordering::Acquire) {
      return Node::failure(WorkflowError::FlowClosed);
    }

    let step = self.steps.fetch_add(1, Ordering::AcqRel) + 1;
    info!(flow_id = %flow_id, step, "step_started");
    self.notify(FlowEvent::StepStarted {
      flow_id: flow_id.to_string(),
      step,
    });

    match self.run_step(submission).await {
      Ok(node @ Node::Success(_)) => {
        self.close();
        info!(flow_id = %flow_id, step, "flow_succeeded");
        self.notify(FlowEvent::FlowSucceeded {
          flow_id: flow_id.to_string(),
        });
        node
      }
      Ok(Node::Failure(failure)) => self.fail(failure.cause),
      Ok(node) => {
        info!(flow_id = %flow_id, step, node = node.kind(), "step_completed");
        self.notify(FlowEvent::StepCompleted {
          flow_id: flow_id.to_string(),
          step,
          node: node.kind().to_string(),
        });
        node
      }
      Err(cause) => self.fail(cause),
    }
  }

  async fn run_step(self: &Arc<Self>, submission: Option<Submission>) -> Result<Node, WorkflowError> {
    let engine = &self.engine;
    let ctx = &self.context;

    if ctx.cancel_token().is_cancelled() {
      return Err(WorkflowError::Cancelled);
    }

    engine.ensure_initialized().await?;

    if let Some(submission) = submission {
      ctx.set(SUBMISSION_KEY, submission);
    }

    let mut request = Request::new();
    for module in &engine.modules {
      request = module.start(ctx, request).await?;
    }

    let response = engine.send(ctx, request).await?;
    debug!(status = response.status(), "response received");

    match self.transform(&response).await? {
      Outcome::Continue {
        step_id,
        fields,
        payload,
      } => {
        let binding = StepBinding {
          flow_id: ctx.flow_id(),
          step_id: step_id.clone(),
          payload: Arc::new(payload),
        };
        let collectors = engine.registry.build_bound(&fields, &binding);
        Ok(Node::Continue(ContinueNode::new(
          step_id,
          binding.payload,
          collectors,
          Arc::clone(self),
        )))
      }
      Outcome::Success(mut session) => {
        for module in &engine.modules {
          session = module.success(ctx, session).await?;
        }
        engine.context.set(SESSION_KEY, session.clone());
        Ok(Node::Success(SuccessNode { session }))
      }
      Outcome::Error {
        message,
        status,
        details,
      } => Ok(Node::Error(ErrorNode {
        message,
        status,
        details,
      })),
      Outcome::Failure(cause) => Err(cause),
    }
  }

  async fn transform(&self, response: &Response) -> Result<Outcome, WorkflowError> {
    for module in &self.engine.modules {
      if let Some(outcome) = module.transform(&self.context, response).await? {
        debug!(module = %module.name(), "response transformed");
        return Ok(outcome);
      }
    }
    Err(WorkflowError::UnhandledResponse {
      status: response.status(),
    })
  }

  fn fail(&self, cause: WorkflowError) -> Node {
    self.close();
    error!(flow_id = %self.flow_id(), error = %cause, "flow_failed");
    self.notify(FlowEvent::FlowFailed {
      flow_id: self.flow_id().to_string(),
      error: cause.to_string(),
    });
    Node::failure(cause)
  }

  fn close(&self) {
    self.closed.store(true, Ordering::Release);
    self.context.discard();
  }

  fn notify(&self, event: FlowEvent) {
    self.engine.notifier.notify(event);
  }
}

/// A composed set of modules plus the workflow-scoped context.
///
/// Cheap to clone; clones share the same context and modules.
#[derive(Clone)]
pub struct Workflow {
  inner: Arc<EngineInner>,
}

impl Workflow {
  /// Create a new workflow from an ordered module list and a transport
  /// client.
  pub fn new(
    modules: Vec<Arc<dyn Module>>,
    http_client: Arc<dyn HttpClient>,
    config: WorkflowConfig,
  ) -> Self {
    let mut builder = Self::builder().http_client(http_client);
    builder.modules = modules;
    builder.config = config;
    builder.build()
  }

  /// Start building a workflow.
  pub fn builder() -> WorkflowBuilder {
    WorkflowBuilder::default()
  }

  /// The workflow-scoped context shared by every run.
  pub fn context(&self) -> &WorkflowContext {
    &self.inner.context
  }

  pub fn config(&self) -> &WorkflowConfig {
    &self.inner.config
  }

  /// Registry used to build step collectors.
  pub fn registry(&self) -> &Arc<CollectorRegistry> {
    &self.inner.registry
  }

  /// Module names in hook order.
  pub fn modules(&self) -> impl Iterator<Item = &str> {
    self.inner.modules.iter().map(|m| m.name())
  }

  /// Begin a new flow run.
  #[instrument(name = "workflow_start", skip(self))]
  pub async fn start(&self) -> Node {
    let run = Arc::new(FlowRun::new(self.inner.clone()));
    info!(flow_id = %run.flow_id(), "flow_started");
    self.inner.notifier.notify(FlowEvent::FlowStarted {
      flow_id: run.flow_id().to_string(),
    });
    run.advance(None).await
  }

  /// The cached session, after module initialization (which may restore a
  /// persisted one).
  pub async fn session(&self) -> Option<Session> {
    if let Err(e) = self.inner.ensure_initialized().await {
      warn!(error = %e, "module initialization failed");
      return None;
    }
    self.inner.context.session()
  }

  /// The signed-in user, if a session is cached.
  pub async fn user(&self) -> Option<User> {
    let session = self.session().await?;
    Some(User::new(self.clone(), session))
  }

  /// Run every module's `sign_off` hook and send the resulting request if
  /// one was addressed. The cached session is dropped even when a hook or
  /// the request fails.
  #[instrument(name = "workflow_sign_off", skip(self))]
  pub async fn sign_off(&self) -> Result<(), WorkflowError> {
    let result = self.sign_off_inner().await;
    self.inner.context.remove(SESSION_KEY);
    match &result {
      Ok(()) => info!("signed_off"),
      Err(e) => warn!(error = %e, "signed_off with error"),
    }
    self.inner.notifier.notify(FlowEvent::SignedOff);
    result
  }

  async fn sign_off_inner(&self) -> Result<(), WorkflowError> {
    self.inner.ensure_initialized().await?;

    let ctx = self.inner.new_flow_context();
    let mut request = Request::new();
    for module in &self.inner.modules {
      request = module.sign_off(&ctx, request).await?;
    }

    let result = if request.has_url() {
      self.inner.send(&ctx, request).await.map(|response| {
        if !response.is_success() {
          warn!(status = response.status(), "sign-off request rejected");
        }
      })
    } else {
      Ok(())
    };
    ctx.discard();
    result
  }

  /// Clear the workflow-scoped context, including the cached session.
  pub fn reset(&self) {
    self.inner.context.clear();
  }
}

impl fmt::Debug for Workflow {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Workflow")
      .field("modules", &self.modules().collect::<Vec<_>>())
      .field("config", &self.inner.config)
      .field("context", &self.inner.context)
      .finish()
  }
}

/// Builder for [`Workflow`].
#[derive(Default)]
pub struct WorkflowBuilder {
  modules: Vec<Arc<dyn Module>>,
  http_client: Option<Arc<dyn HttpClient>>,
  registry: Option<Arc<CollectorRegistry>>,
  notifier: Option<Arc<dyn FlowNotifier>>,
  config: WorkflowConfig,
  cancel: Option<CancellationToken>,
}

impl WorkflowBuilder {
  /// Append a module. Registration order is hook order.
  pub fn module(mut self, module: impl Module + 'static) -> Self {
    self.modules.push(Arc::new(module));
    self
  }

  /// Append a module that is also held elsewhere.
  pub fn shared_module(mut self, module: Arc<dyn Module>) -> Self {
    self.modules.push(module);
    self
  }

  /// Client handed to transport modules.
  pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
    self.http_client = Some(client);
    self
  }

  /// Upper bound for one transport call.
  pub fn timeout(mut self, timeout: Duration) -> Self {
    self.config.timeout = timeout;
    self
  }

  /// Collector registry used to build step collectors. Defaults to one with
  /// every built-in collector type.
  pub fn registry(mut self, registry: Arc<CollectorRegistry>) -> Self {
    self.registry = Some(registry);
    self
  }

  /// Receiver of flow lifecycle events.
  pub fn notifier(mut self, notifier: impl FlowNotifier + 'static) -> Self {
    self.notifier = Some(Arc::new(notifier));
    self
  }

  /// Parent token; every flow run gets a child of it.
  pub fn cancel_token(mut self, cancel: CancellationToken) -> Self {
    self.cancel = Some(cancel);
    self
  }

  /// Assemble the workflow. No module hook runs until the first `start`,
  /// `session` or `sign_off`.
  pub fn build(self) -> Workflow {
    let modules = self.modules;
    Workflow {
      inner: Arc::new(EngineInner {
        initialized: modules.iter().map(|_| OnceCell::new()).collect(),
        modules,
        http_client: self.http_client,
        registry: self
          .registry
          .unwrap_or_else(|| Arc::new(CollectorRegistry::with_defaults())),
        notifier: self.notifier.unwrap_or_else(|| Arc::new(NoopNotifier)),
        config: self.config,
        context: WorkflowContext::new(),
        cancel: self.cancel.unwrap_or_default(),
      }),
    }
  }
}
