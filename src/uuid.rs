//! UUID coercion.
//!
//! Accepts canonical hyphenated UUID text of any version. A match returns the
//! text as given (after trimming); nothing is reformatted or lowercased.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::trace;

use crate::error::{ErrorKind, RuleError, SanitizeError};
use crate::input::Input;
use crate::rules::{self, resolve, RuleSet};
use crate::sanitizer::Sanitizer;
use crate::store;

static UUID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("uuid pattern is valid")
});

/// Computes a replacement UUID from the rejected input.
pub type Generator = Arc<dyn Fn(&Input) -> String + Send + Sync>;

/// The `default` rule of the UUID domain.
#[derive(Clone)]
pub enum UuidDefault {
    /// Raise [`ErrorKind::InvalidUuid`].
    Fail,
    /// Use this text.
    Value(String),
    /// Compute a value from the rejected input.
    Generate(Generator),
}

impl UuidDefault {
    /// Wraps a generator closure.
    pub fn generate(f: impl Fn(&Input) -> String + Send + Sync + 'static) -> Self {
        UuidDefault::Generate(Arc::new(f))
    }

    /// A generator producing a fresh random (version 4) UUID.
    ///
    /// # Examples
    ///
    /// ```
    /// use scalar_sanitize::{Sanitizer, UuidDefault, UuidRules, UuidSanitizer};
    ///
    /// let sanitizer = UuidSanitizer::new(UuidRules {
    ///     default: UuidDefault::random_v4(),
    ///     ..Default::default()
    /// });
    /// let id = sanitizer.sanitize("not a uuid").unwrap();
    /// assert_eq!(id.len(), 36);
    /// ```
    pub fn random_v4() -> Self {
        Self::generate(|_| ::uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Debug for UuidDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UuidDefault::Fail => f.write_str("Fail"),
            UuidDefault::Value(value) => f.debug_tuple("Value").field(value).finish(),
            UuidDefault::Generate(_) => f.write_str("Generate(..)"),
        }
    }
}

/// UUID sanitizer rules.
#[derive(Debug, Clone)]
pub struct UuidRules {
    /// Result for input that is not a UUID. Default: fail.
    pub default: UuidDefault,
    /// Trim strings before matching. Default `true`.
    pub trim_strings: bool,
}

impl Default for UuidRules {
    fn default() -> Self {
        Self {
            default: UuidDefault::Fail,
            trim_strings: true,
        }
    }
}

/// Partial [`UuidRules`]; `None` keeps the underlying value.
#[derive(Debug, Clone, Default)]
pub struct UuidOverrides {
    /// See [`UuidRules::default`].
    pub default: Option<UuidDefault>,
    /// See [`UuidRules::trim_strings`].
    pub trim_strings: Option<bool>,
}

impl RuleSet for UuidRules {
    type Overrides = UuidOverrides;

    const DOMAIN: &'static str = "uuid";

    const KEYS: &'static [&'static str] = &["default", "trimStrings"];

    fn resolve(&self, local: &UuidOverrides) -> Self {
        Self {
            default: resolve(&local.default, &self.default),
            trim_strings: resolve(&local.trim_strings, &self.trim_strings),
        }
    }

    fn apply(&mut self, update: UuidOverrides) {
        *self = self.resolve(&update);
    }

    fn parse_key(key: &str, value: &Value, update: &mut UuidOverrides) -> Result<(), RuleError> {
        match key {
            // generators cannot be expressed in JSON
            "default" => {
                update.default = Some(match value.as_str() {
                    Some("error") => UuidDefault::Fail,
                    Some(text) => UuidDefault::Value(text.to_string()),
                    None => {
                        return Err(rules::invalid(Self::DOMAIN, key, "a string or \"error\""))
                    }
                })
            }
            "trimStrings" => update.trim_strings = Some(rules::parse_bool(Self::DOMAIN, key, value)?),
            _ => {}
        }
        Ok(())
    }
}

/// Returns `true` if `text` is canonical hyphenated UUID text.
pub fn is_uuid(text: &str) -> bool {
    UUID_PATTERN.is_match(text)
}

/// Validates UUID text.
///
/// # Examples
///
/// ```
/// use scalar_sanitize::{ErrorKind, Sanitizer, UuidSanitizer};
///
/// let sanitizer = UuidSanitizer::default();
/// assert_eq!(
///     sanitizer.sanitize(" 4ab23e20-fee3-11ed-8f2a-a1bf63269e35 ").as_deref(),
///     Ok("4ab23e20-fee3-11ed-8f2a-a1bf63269e35")
/// );
/// assert_eq!(
///     sanitizer.sanitize(42).unwrap_err().kind(),
///     ErrorKind::InvalidUuid
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct UuidSanitizer {
    rules: Arc<UuidRules>,
}

impl UuidSanitizer {
    /// Creates a sanitizer with fixed rules.
    pub fn new(rules: UuidRules) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    /// Creates a sanitizer from the current process-wide rules.
    pub fn global() -> Self {
        Self {
            rules: store::UUID.snapshot(),
        }
    }

    /// Returns a sanitizer whose rules are these rules overridden by `local`.
    pub fn with_overrides(&self, local: &UuidOverrides) -> Self {
        Self::new(self.rules.resolve(local))
    }

    /// Returns the effective rules.
    pub fn rules(&self) -> &UuidRules {
        &self.rules
    }
}

impl Sanitizer for UuidSanitizer {
    type Output = String;

    fn sanitize_with(&self, input: Input, field: Option<&str>) -> Result<String, SanitizeError> {
        let rules = &self.rules;
        if let Input::Str(text) = &input {
            let text = if rules.trim_strings {
                text.trim()
            } else {
                text.as_str()
            };
            if is_uuid(text) {
                return Ok(text.to_string());
            }
        }

        trace!(input = input.type_name(), "uuid input rejected");
        match &rules.default {
            UuidDefault::Fail => {
                let value = match &input {
                    Input::Str(text) if rules.trim_strings => text.trim().to_string(),
                    other => other.to_string(),
                };
                Err(SanitizeError::new(ErrorKind::InvalidUuid)
                    .with_field(field)
                    .with_value(value))
            }
            UuidDefault::Value(value) => Ok(value.clone()),
            UuidDefault::Generate(generate) => Ok(generate(&input)),
        }
    }
}

fn global_with(local: Option<&UuidOverrides>) -> UuidSanitizer {
    let global = UuidSanitizer::global();
    match local {
        Some(local) => global.with_overrides(local),
        None => global,
    }
}

/// Validates UUID text with the process-wide rules overridden by `local`.
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidUuid`] when the input is not a UUID and the
/// `default` rule is [`UuidDefault::Fail`].
pub fn sanitize(
    input: impl Into<Input>,
    local: Option<&UuidOverrides>,
    field: Option<&str>,
) -> Result<String, SanitizeError> {
    global_with(local).sanitize_with(input.into(), field)
}

/// Like [`sanitize`], but blank input (missing, null, `NaN`, whitespace) is `None`.
///
/// # Errors
///
/// See [`sanitize`].
pub fn or_null(
    input: impl Into<Input>,
    local: Option<&UuidOverrides>,
    field: Option<&str>,
) -> Result<Option<String>, SanitizeError> {
    global_with(local).or_null().sanitize_with(input.into(), field)
}
