use std::any::Any;
use std::collections::HashSet;

use serde_json::Value;

use crate::collector::{
  Collector, FieldInfo, StepBinding, TypedCollector, ValidationError, encode,
};

/// One rule of a server-supplied password policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordRule {
  Length { min: usize, max: Option<usize> },
  MinUniqueCharacters(usize),
  MaxRepeatedCharacters(usize),
  MinCharacters { characters: String, min: usize },
}

/// Password policy rules, kept in the order the server declared them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PasswordPolicy {
  rules: Vec<PasswordRule>,
}

impl PasswordPolicy {
  /// Parse a policy object. Unknown keys and malformed rules are skipped.
  ///
  /// ```json
  /// {
  ///   "length": { "min": 8, "max": 255 },
  ///   "minUniqueCharacters": 5,
  ///   "maxRepeatedCharacters": 2,
  ///   "minCharacters": { "0123456789": 1, "ABCDEFGHIJKLMNOPQRSTUVWXYZ": 1 }
  /// }
  /// ```
  pub fn from_json(json: &Value) -> Option<Self> {
    let object = json.as_object()?;
    let mut rules = Vec::new();

    for (name, value) in object {
      match name.as_str() {
        "length" => {
          let min = value.get("min").and_then(as_count).unwrap_or(0);
          let max = value.get("max").and_then(as_count);
          rules.push(PasswordRule::Length { min, max });
        }
        "minUniqueCharacters" => {
          if let Some(min) = as_count(value) {
            rules.push(PasswordRule::MinUniqueCharacters(min));
          }
        }
        "maxRepeatedCharacters" => {
          if let Some(max) = as_count(value) {
            rules.push(PasswordRule::MaxRepeatedCharacters(max));
          }
        }
        "minCharacters" => {
          if let Some(sets) = value.as_object() {
            for (characters, min) in sets {
              if let Some(min) = as_count(min) {
                rules.push(PasswordRule::MinCharacters {
                  characters: characters.clone(),
                  min,
                });
              }
            }
          }
        }
        _ => {}
      }
    }

    Some(Self { rules })
  }

  pub fn rules(&self) -> &[PasswordRule] {
    &self.rules
  }

  /// Check a non-empty password; one error per violated rule, in rule order.
  pub fn check(&self, password: &str) -> Vec<ValidationError> {
    self
      .rules
      .iter()
      .filter_map(|rule| violation(rule, password))
      .collect()
  }
}

fn as_count(value: &Value) -> Option<usize> {
  value.as_u64().and_then(|n| usize::try_from(n).ok())
}

fn violation(rule: &PasswordRule, password: &str) -> Option<ValidationError> {
  match rule {
    PasswordRule::Length { min, max } => {
      let length = password.chars().count();
      let too_long = max.is_some_and(|max| length > max);
      (length < *min || too_long).then_some(ValidationError::InvalidLength {
        min: *min,
        max: *max,
      })
    }
    PasswordRule::MinUniqueCharacters(min) => {
      let unique = password.chars().collect::<HashSet<_>>().len();
      (unique < *min).then_some(ValidationError::UniqueCharacter { min: *min })
    }
    PasswordRule::MaxRepeatedCharacters(max) => {
      (longest_run(password) > *max).then_some(ValidationError::MaxRepeat { max: *max })
    }
    PasswordRule::MinCharacters { characters, min } => {
      let count = password.chars().filter(|c| characters.contains(*c)).count();
      (count < *min).then(|| ValidationError::MinCharacters {
        characters: characters.clone(),
        min: *min,
      })
    }
  }
}

/// Length of the longest run of one repeated character.
fn longest_run(password: &str) -> usize {
  let mut longest = 0;
  let mut current = 0;
  let mut previous = None;
  for c in password.chars() {
    if previous == Some(c) {
      current += 1;
    } else {
      current = 1;
      previous = Some(c);
    }
    longest = longest.max(current);
  }
  longest
}

/// Secret input (`PASSWORD`, `PASSWORD_VERIFY`).
///
/// The policy comes from the field's `passwordPolicy`; when the field has
/// none, the step-level policy is picked up on bind.
#[derive(Clone)]
pub struct PasswordCollector {
  info: FieldInfo,
  value: String,
  verify: bool,
  policy: Option<PasswordPolicy>,
}

impl PasswordCollector {
  pub fn from_json(json: &Value) -> Self {
    let info = FieldInfo::from_json(json);
    let verify = info.kind == "PASSWORD_VERIFY"
      || json.get("verify").and_then(Value::as_bool).unwrap_or(false);
    Self {
      policy: json.get("passwordPolicy").and_then(PasswordPolicy::from_json),
      info,
      value: String::new(),
      verify,
    }
  }

  /// Whether the UI should ask for the password twice.
  pub fn verify(&self) -> bool {
    self.verify
  }

  pub fn policy(&self) -> Option<&PasswordPolicy> {
    self.policy.as_ref()
  }

  pub fn set_password(&mut self, value: impl Into<String>) {
    self.value = value.into();
  }

  /// Forget the entered password.
  pub fn clear(&mut self) {
    self.value.clear();
  }
}

impl std::fmt::Debug for PasswordCollector {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PasswordCollector")
      .field("info", &self.info)
      .field("value", &"<redacted>")
      .field("verify", &self.verify)
      .field("policy", &self.policy)
      .finish()
  }
}

impl Collector for PasswordCollector {
  fn kind(&self) -> &str {
    &self.info.kind
  }

  fn key(&self) -> &str {
    &self.info.key
  }

  fn label(&self) -> &str {
    &self.info.label
  }

  fn required(&self) -> bool {
    self.info.required
  }

  fn metadata(&self) -> &Value {
    &self.info.raw
  }

  fn initialize(&mut self, value: &Value) {
    if let Some(text) = value.as_str() {
      self.value = text.to_string();
    }
  }

  fn payload(&self) -> Option<Value> {
    encode(self)
  }

  fn validate(&self) -> Vec<ValidationError> {
    if self.value.is_empty() {
      return if self.info.required {
        vec![ValidationError::Required]
      } else {
        Vec::new()
      };
    }
    self
      .policy
      .as_ref()
      .map(|policy| policy.check(&self.value))
      .unwrap_or_default()
  }

  fn bind(&mut self, binding: &StepBinding) {
    if self.policy.is_some() {
      return;
    }
    let payload = binding.payload.as_ref();
    self.policy = payload
      .pointer("/form/passwordPolicy")
      .or_else(|| payload.get("passwordPolicy"))
      .and_then(PasswordPolicy::from_json);
  }

  fn as_any(&self) -> &dyn Any {
    self
  }

  fn as_any_mut(&mut self) -> &mut dyn Any {
    self
  }
}

impl TypedCollector for PasswordCollector {
  type Payload = String;

  fn value(&self) -> Option<String> {
    (!self.value.is_empty()).then(|| self.value.clone())
  }
}
