//! Registry mapping field type discriminators to collector factories.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;
use tracing::debug;

use crate::action::{ActionCollector, ActionKind};
use crate::binding::DeviceBindingCollector;
use crate::collector::{Collector, StepBinding};
use crate::idp::IdpCollector;
use crate::label::LabelCollector;
use crate::password::PasswordCollector;
use crate::recaptcha::RecaptchaCollector;
use crate::select::{MultiSelectCollector, SingleSelectCollector};
use crate::text::TextCollector;

/// Builds a collector from one field description, or declines with `None`.
pub type CollectorFactory = Arc<dyn Fn(&Value) -> Option<Box<dyn Collector>> + Send + Sync>;

/// The type discriminator of a field: `inputType` first, then `type`.
pub fn discriminator(field: &Value) -> Option<&str> {
  field
    .get("inputType")
    .and_then(Value::as_str)
    .or_else(|| field.get("type").and_then(Value::as_str))
}

/// Registry of collector factories.
///
/// Registration takes the write lock; building holds the read lock for the
/// whole step, so builds may run concurrently with each other but never with
/// a registration. Factories must not call back into the registry.
pub struct CollectorRegistry {
  factories: RwLock<HashMap<String, CollectorFactory>>,
}

impl CollectorRegistry {
  /// An empty registry.
  pub fn new() -> Self {
    Self {
      factories: RwLock::new(HashMap::new()),
    }
  }

  /// A registry with every built-in collector registered.
  pub fn with_defaults() -> Self {
    let registry = Self::new();
    registry.register("TEXT", |json| boxed(TextCollector::from_json(json)));
    registry.register("PASSWORD", |json| boxed(PasswordCollector::from_json(json)));
    registry.register("PASSWORD_VERIFY", |json| {
      boxed(PasswordCollector::from_json(json))
    });
    registry.register("SUBMIT_BUTTON", |json| {
      boxed(ActionCollector::from_json(json, ActionKind::Submit))
    });
    registry.register("ACTION", |json| {
      boxed(ActionCollector::from_json(json, ActionKind::Submit))
    });
    registry.register("FLOW_BUTTON", |json| {
      boxed(ActionCollector::from_json(json, ActionKind::Flow))
    });
    registry.register("FLOW_LINK", |json| {
      boxed(ActionCollector::from_json(json, ActionKind::Flow))
    });
    registry.register("LABEL", |json| boxed(LabelCollector::from_json(json)));
    registry.register("SINGLE_SELECT", |json| {
      boxed(SingleSelectCollector::from_json(json))
    });
    registry.register("MULTI_SELECT", |json| {
      boxed(MultiSelectCollector::from_json(json))
    });
    registry.register("SOCIAL_LOGIN_BUTTON", |json| {
      boxed(IdpCollector::from_json(json))
    });
    registry.register("DEVICE_BINDING", |json| {
      boxed(DeviceBindingCollector::from_json(json))
    });
    registry.register("RECAPTCHA_ENTERPRISE", |json| {
      boxed(RecaptchaCollector::from_json(json))
    });
    registry
  }

  /// Register (or replace) the factory for a type key.
  pub fn register<F>(&self, type_key: impl Into<String>, factory: F)
  where
    F: Fn(&Value) -> Option<Box<dyn Collector>> + Send + Sync + 'static,
  {
    self
      .factories
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(type_key.into(), Arc::new(factory));
  }

  /// Remove the factory for a type key. Returns whether one was registered.
  pub fn unregister(&self, type_key: &str) -> bool {
    self
      .factories
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .remove(type_key)
      .is_some()
  }

  pub fn contains(&self, type_key: &str) -> bool {
    self
      .factories
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .contains_key(type_key)
  }

  /// Build collectors for a step's field descriptions, in field order.
  ///
  /// Fields that are not objects, have no discriminator, or whose type has no
  /// factory are skipped.
  pub fn build(&self, fields: &[Value]) -> Vec<Box<dyn Collector>> {
    let factories = self.factories.read().unwrap_or_else(PoisonError::into_inner);
    let mut collectors = Vec::with_capacity(fields.len());

    for field in fields.iter().filter(|f| f.is_object()) {
      let Some(kind) = discriminator(field) else {
        debug!(field = %field, "skipping field without a type");
        continue;
      };
      let Some(factory) = factories.get(kind) else {
        debug!(kind = %kind, "skipping field of unregistered type");
        continue;
      };
      if let Some(collector) = factory(field) {
        collectors.push(collector);
      }
    }

    collectors
  }

  /// Inject the step back-reference into every collector.
  pub fn bind(collectors: &mut [Box<dyn Collector>], binding: &StepBinding) {
    for collector in collectors.iter_mut() {
      collector.bind(binding);
    }
  }

  /// [`build`](Self::build) followed by [`bind`](Self::bind).
  pub fn build_bound(&self, fields: &[Value], binding: &StepBinding) -> Vec<Box<dyn Collector>> {
    let mut collectors = self.build(fields);
    Self::bind(&mut collectors, binding);
    collectors
  }
}

impl Default for CollectorRegistry {
  fn default() -> Self {
    Self::with_defaults()
  }
}

impl fmt::Debug for CollectorRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut keys: Vec<String> = self
      .factories
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .keys()
      .cloned()
      .collect();
    keys.sort();
    f.debug_struct("CollectorRegistry")
      .field("types", &keys)
      .finish()
  }
}

fn boxed<C: Collector + 'static>(collector: C) -> Option<Box<dyn Collector>> {
  Some(Box::new(collector))
}
