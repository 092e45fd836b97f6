//! Collectors turn the field descriptions of a server step into typed,
//! validated inputs.
//!
//! The [`CollectorRegistry`] maps a field's type discriminator to a factory.
//! Unknown field types are skipped so newer servers keep working with older
//! clients. After construction the registry injects a [`StepBinding`] into
//! every collector; factories never see the enclosing flow.
//!
//! ```ignore
//! let registry = CollectorRegistry::with_defaults();
//! let mut collectors = registry.build(&fields);
//! collectors[0].initialize(&json!("alice"));
//! assert!(collectors[0].validate().is_empty());
//! ```

mod action;
mod binding;
mod collector;
mod error;
mod idp;
mod label;
mod password;
mod presenter;
mod recaptcha;
mod registry;
mod select;
mod text;

pub use action::{ActionCollector, ActionKind};
pub use binding::{DeviceBindingCollector, KeySigner, SigningRequest};
pub use collector::{Collector, FieldInfo, StepBinding, TypedCollector, ValidationError};
pub use error::{CapabilityError, PresentError};
pub use idp::IdpCollector;
pub use label::LabelCollector;
pub use password::{PasswordCollector, PasswordPolicy, PasswordRule};
pub use presenter::{ExclusivePresenter, PresentRequest, Presenter};
pub use recaptcha::{RecaptchaCollector, TokenProvider, TokenRequest};
pub use registry::{CollectorFactory, CollectorRegistry, discriminator};
pub use select::{MultiSelectCollector, SelectOption, SingleSelectCollector};
pub use text::TextCollector;
