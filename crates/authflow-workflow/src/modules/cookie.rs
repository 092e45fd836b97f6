//! Cookie jar module.
//!
//! Cookies received during a run are kept in the flow context and replayed on
//! every following request of that run. Cookies named in `persist` are copied
//! to the workflow context once the flow succeeds, so later runs and sign-off
//! send them too.

use std::collections::BTreeMap;

use async_trait::async_trait;
use authflow_config::CookieConfig;
use authflow_http::{Request, Response};
use tracing::debug;

use crate::context::FlowContext;
use crate::error::WorkflowError;
use crate::module::{Configurable, Module, Outcome};
use crate::node::Session;

const JAR_KEY: &str = "authflow.cookies";

/// Persisted cookies, name to value.
type Jar = BTreeMap<String, String>;

/// Cookies seen during a run. `None` marks a cookie the server expired.
type FlowJar = BTreeMap<String, Option<String>>;

#[derive(Debug, Clone, Default)]
pub struct CookieModule {
  config: CookieConfig,
}

impl CookieModule {
  /// Cookies persisted in the workflow context.
  pub fn persisted(ctx: &FlowContext) -> BTreeMap<String, String> {
    ctx.shared().get::<Jar>(JAR_KEY).unwrap_or_default()
  }
}

impl Configurable for CookieModule {
  type Config = CookieConfig;

  fn with_config(config: CookieConfig) -> Self {
    Self { config }
  }
}

/// Parse a `Set-Cookie` header into its name and value. The value is `None`
/// when the cookie is being expired.
fn parse_set_cookie(header: &str) -> Option<(String, Option<String>)> {
  let mut parts = header.split(';');
  let (name, value) = parts.next()?.split_once('=')?;
  let name = name.trim();
  if name.is_empty() {
    return None;
  }
  let value = value.trim();
  let expired = parts.any(|attr| attr.trim().eq_ignore_ascii_case("max-age=0"));
  let value = (!expired && !value.is_empty()).then(|| value.to_string());
  Some((name.to_string(), value))
}

fn cookie_header(jar: &Jar) -> Option<String> {
  if jar.is_empty() {
    return None;
  }
  let pairs: Vec<String> = jar.iter().map(|(k, v)| format!("{k}={v}")).collect();
  Some(pairs.join("; "))
}

#[async_trait]
impl Module for CookieModule {
  fn name(&self) -> &str {
    "cookie"
  }

  async fn start(&self, ctx: &FlowContext, mut request: Request) -> Result<Request, WorkflowError> {
    let mut jar = Self::persisted(ctx);
    for (name, value) in ctx.get::<FlowJar>(JAR_KEY).unwrap_or_default() {
      match value {
        Some(value) => {
          jar.insert(name, value);
        }
        None => {
          jar.remove(&name);
        }
      }
    }
    if let Some(header) = cookie_header(&jar) {
      request.set_header("Cookie", header);
    }
    Ok(request)
  }

  async fn transform(
    &self,
    ctx: &FlowContext,
    response: &Response,
  ) -> Result<Option<Outcome>, WorkflowError> {
    let received: Vec<(String, Option<String>)> = response
      .header_all("set-cookie")
      .filter_map(parse_set_cookie)
      .collect();
    if !received.is_empty() {
      debug!(count = received.len(), "cookies received");
      ctx.update::<FlowJar, _>(JAR_KEY, |jar| {
        let mut jar = jar.unwrap_or_default();
        jar.extend(received);
        Some(jar)
      });
    }
    Ok(None)
  }

  async fn success(&self, ctx: &FlowContext, session: Session) -> Result<Session, WorkflowError> {
    let flow_jar = ctx.get::<FlowJar>(JAR_KEY).unwrap_or_default();
    let persist = &self.config.persist;
    ctx.shared().update::<Jar, _>(JAR_KEY, |jar| {
      let mut jar = jar.unwrap_or_default();
      for (name, value) in flow_jar.into_iter().filter(|(n, _)| persist.contains(n)) {
        match value {
          Some(value) => {
            jar.insert(name, value);
          }
          None => {
            jar.remove(&name);
          }
        }
      }
      (!jar.is_empty()).then_some(jar)
    });
    Ok(session)
  }

  async fn sign_off(&self, ctx: &FlowContext, mut request: Request) -> Result<Request, WorkflowError> {
    if let Some(header) = cookie_header(&Self::persisted(ctx)) {
      request.set_header("Cookie", header);
    }
    ctx.shared().remove(JAR_KEY);
    Ok(request)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_set_cookie() {
    assert_eq!(
      parse_set_cookie("ST=abc; Path=/; HttpOnly"),
      Some(("ST".to_string(), Some("abc".to_string())))
    );
    assert_eq!(
      parse_set_cookie("ST=abc; Max-Age=0"),
      Some(("ST".to_string(), None))
    );
    assert_eq!(parse_set_cookie("ST="), Some(("ST".to_string(), None)));
    assert_eq!(parse_set_cookie("garbage"), None);
    assert_eq!(parse_set_cookie("=value"), None);
  }

  #[test]
  fn test_cookie_header() {
    let jar = Jar::from([
      ("b".to_string(), "2".to_string()),
      ("a".to_string(), "1".to_string()),
    ]);
    assert_eq!(cookie_header(&jar).as_deref(), Some("a=1; b=2"));
    assert_eq!(cookie_header(&Jar::new()), None);
  }
}
