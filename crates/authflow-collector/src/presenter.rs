//! Interactive presentation collaborator (system browser, social login).

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::error::PresentError;

/// What to present and where the outcome comes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentRequest {
  pub url: String,
  pub redirect_uri: String,
}

/// Presents a URL to the user and waits for the callback URL or token.
#[async_trait]
pub trait Presenter: Send + Sync {
  async fn present(&self, request: PresentRequest) -> Result<String, PresentError>;
}

/// Allows one presentation at a time; a second concurrent call fails fast
/// with [`PresentError::AlreadyInProgress`].
pub struct ExclusivePresenter<P> {
  inner: P,
  in_flight: AtomicBool,
}

impl<P> ExclusivePresenter<P> {
  pub fn new(inner: P) -> Self {
    Self {
      inner,
      in_flight: AtomicBool::new(false),
    }
  }

  pub fn is_presenting(&self) -> bool {
    self.in_flight.load(Ordering::Acquire)
  }
}

/// Clears the in-flight flag when the presentation finishes or is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
  fn drop(&mut self) {
    self.0.store(false, Ordering::Release);
  }
}

#[async_trait]
impl<P: Presenter> Presenter for ExclusivePresenter<P> {
  async fn present(&self, request: PresentRequest) -> Result<String, PresentError> {
    if self
      .in_flight
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .is_err()
    {
      return Err(PresentError::AlreadyInProgress);
    }
    let _guard = InFlight(&self.in_flight);
    self.inner.present(request).await
  }
}
