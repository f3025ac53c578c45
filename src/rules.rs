//! Rule values and the local-over-global resolver.
//!
//! Every sanitizer domain has a full rule set (hard-coded defaults, or the
//! current process-wide values held by a [`RuleStore`](crate::RuleStore)) and a
//! partial companion of `Option` fields used for per-call overrides and for
//! store updates. Resolution is key by key: a key present in the override
//! wins, anything else comes from the full set.
//!
//! Policy values are tagged enums rather than sentinels mixed into the value
//! type, so each variant only carries the data it needs.

use std::fmt;

use serde_json::Value;

use crate::error::{RuleError, SanitizeError};
use crate::input::Input;

/// The `default` rule of a domain: a concrete value or a hard failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback<T> {
    /// Use this value.
    Value(T),
    /// Raise an error of the kind that triggered the fallback.
    Fail,
}

impl<T: Clone> Fallback<T> {
    /// Returns the configured value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Fallback::Value(value) => Some(value),
            Fallback::Fail => None,
        }
    }

    /// Yields the fallback value or the error built by `fail`.
    pub(crate) fn or_fail(
        &self,
        fail: impl FnOnce() -> SanitizeError,
    ) -> Result<T, SanitizeError> {
        match self {
            Fallback::Value(value) => Ok(value.clone()),
            Fallback::Fail => Err(fail()),
        }
    }
}

/// What to do with one class of irregular input (null, missing, NaN).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition<T> {
    /// Substitute this value.
    Replace(T),
    /// Defer to the domain's `default` rule, which may itself fail.
    UseDefault,
    /// Raise an error.
    Fail,
}

impl<T: Clone> Disposition<T> {
    /// Applies the disposition.
    ///
    /// `UseDefault` consults `default`; when that is [`Fallback::Fail`] the
    /// error is the same one `Fail` would have raised.
    pub(crate) fn dispatch(
        &self,
        default: &Fallback<T>,
        fail: impl FnOnce() -> SanitizeError,
    ) -> Result<T, SanitizeError> {
        match self {
            Disposition::Replace(value) => Ok(value.clone()),
            Disposition::UseDefault => default.or_fail(fail),
            Disposition::Fail => Err(fail()),
        }
    }
}

/// Returns the local value when present, otherwise the global one.
///
/// # Examples
///
/// ```
/// use scalar_sanitize::rules::resolve;
///
/// assert_eq!(resolve(&Some(3), &1), 3);
/// assert_eq!(resolve(&None, &1), 1);
/// ```
pub fn resolve<T: Clone>(local: &Option<T>, global: &T) -> T {
    local.as_ref().unwrap_or(global).clone()
}

/// A complete table of rules for one sanitizer domain.
///
/// Implementors pair a full rule set (`Self`, whose `Default` is the
/// hard-coded baseline) with a partial `Overrides` type.
pub trait RuleSet: Clone + Default + fmt::Debug + Send + Sync + 'static {
    /// Partial rule set, every key optional.
    type Overrides: Clone + Default + fmt::Debug;

    /// Domain name used in diagnostics.
    const DOMAIN: &'static str;

    /// Rule keys accepted by JSON updates, spelled as in configuration files.
    const KEYS: &'static [&'static str];

    /// Returns the effective rules for one call: `local` wins key by key.
    fn resolve(&self, local: &Self::Overrides) -> Self;

    /// Replaces every key present in `update`, applying any cross-key
    /// normalization the domain requires.
    fn apply(&mut self, update: Self::Overrides);

    /// Parses the JSON value of one known key into `update`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidValue`] when the value has the wrong shape.
    fn parse_key(key: &str, value: &Value, update: &mut Self::Overrides)
        -> Result<(), RuleError>;
}

// JSON helpers shared by the domain rule sets.

pub(crate) fn invalid(domain: &'static str, key: &str, expected: &'static str) -> RuleError {
    RuleError::InvalidValue {
        domain,
        key: key.to_string(),
        expected,
    }
}

pub(crate) fn parse_bool(domain: &'static str, key: &str, value: &Value) -> Result<bool, RuleError> {
    value
        .as_bool()
        .ok_or_else(|| invalid(domain, key, "a boolean"))
}

/// Reads an integer, rounding finite floats the same way numeric input is rounded.
pub(crate) fn json_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|n| n.is_finite())
            .map(crate::numeric::to_safe_integer)
    })
}

pub(crate) fn parse_fallback<T>(
    domain: &'static str,
    key: &str,
    value: &Value,
    concrete: impl FnOnce(&Value) -> Option<T>,
    expected: &'static str,
) -> Result<Fallback<T>, RuleError> {
    if value.as_str() == Some("error") {
        return Ok(Fallback::Fail);
    }
    concrete(value)
        .map(Fallback::Value)
        .ok_or_else(|| invalid(domain, key, expected))
}

pub(crate) fn parse_disposition<T>(
    domain: &'static str,
    key: &str,
    value: &Value,
    concrete: impl FnOnce(&Value) -> Option<T>,
    expected: &'static str,
) -> Result<Disposition<T>, RuleError> {
    match value.as_str() {
        Some("default") => Ok(Disposition::UseDefault),
        Some("error") => Ok(Disposition::Fail),
        _ => concrete(value)
            .map(Disposition::Replace)
            .ok_or_else(|| invalid(domain, key, expected)),
    }
}

/// Reads a list of strings (`null` meaning "no list"), rendering non-string
/// members as text.
pub(crate) fn parse_string_list(
    domain: &'static str,
    key: &str,
    value: &Value,
) -> Result<Option<Vec<String>>, RuleError> {
    match value {
        Value::Null => Ok(None),
        Value::Array(items) => Ok(Some(
            items
                .iter()
                .map(|item| Input::from(item).to_string())
                .collect(),
        )),
        _ => Err(invalid(domain, key, "an array of strings or null")),
    }
}
