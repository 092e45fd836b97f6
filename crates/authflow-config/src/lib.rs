//! Authflow Config
//!
//! Serializable configuration for a workflow and its bundled modules. These
//! types describe *what* a workflow talks to (start endpoint, headers, cookie
//! names to keep, where the session is stored) and are turned into a running
//! engine by `Workflow::from_def`.
//!
//! Every section is optional; an omitted section means the module is not
//! installed.
//!
//! ```json
//! {
//!   "timeout_ms": 10000,
//!   "headers": { "values": { "X-Client": "mobile" } },
//!   "cookies": { "persist": ["ST"] },
//!   "pkce": {},
//!   "forms": { "start_url": "https://auth.example.com/flows/login" },
//!   "session": { "sign_off_url": "https://auth.example.com/signoff" }
//! }
//! ```

mod enums;
mod modules;
mod workflow;

pub use enums::HttpMethod;
pub use modules::{CookieConfig, FormsConfig, HeadersConfig, PkceConfig, SessionConfig};
pub use workflow::{DEFAULT_TIMEOUT_MS, WorkflowDef};
