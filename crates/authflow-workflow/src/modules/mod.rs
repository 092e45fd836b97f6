//! Modules bundled with the engine.

mod cookie;
mod forms;
mod headers;
mod pkce;
mod session;
mod transport;

pub use cookie::CookieModule;
pub use forms::{FormsModule, NEXT_URL_KEY};
pub use headers::HeadersModule;
pub use pkce::{PkceModule, VERIFIER_KEY, code_challenge, generate_verifier};
pub use session::SessionModule;
pub use transport::TransportModule;
