//! Boolean coercion.
//!
//! Booleans pass through, strings are matched against configurable true and
//! false word lists, and the remaining irregular inputs (missing, null, not a
//! number) are routed through their dispositions.

use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use crate::error::{ErrorKind, RuleError, SanitizeError};
use crate::input::Input;
use crate::numeric;
use crate::rules::{self, resolve, Disposition, Fallback, RuleSet};
use crate::sanitizer::Sanitizer;
use crate::store;

/// Boolean sanitizer rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolRules {
    /// Value for any input the other rules do not handle. Default `false`.
    pub default: Fallback<bool>,
    /// Null input. Default: use `default`.
    pub null_values: Disposition<bool>,
    /// Input that is not a number, such as unknown words. Default: use `default`.
    pub nan_values: Disposition<bool>,
    /// Missing input. Default: use `default`.
    pub undefined_values: Disposition<bool>,
    /// Trim strings before matching. Default `true`.
    pub trim_strings: bool,
    /// Lowercase strings before matching. Default `true`.
    pub lower_strings: bool,
    /// Strings read as `false`; `None` means every string not in `true_strings`.
    pub false_strings: Option<Vec<String>>,
    /// Strings read as `true`; `None` means every string not in `false_strings`.
    pub true_strings: Option<Vec<String>>,
}

impl Default for BoolRules {
    fn default() -> Self {
        Self {
            default: Fallback::Value(false),
            null_values: Disposition::UseDefault,
            nan_values: Disposition::UseDefault,
            undefined_values: Disposition::UseDefault,
            trim_strings: true,
            lower_strings: true,
            false_strings: Some(words(&["false", "no", "0", ""])),
            true_strings: Some(words(&["true", "yes", "1"])),
        }
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

/// Partial [`BoolRules`]; `None` keeps the underlying value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoolOverrides {
    /// See [`BoolRules::default`].
    pub default: Option<Fallback<bool>>,
    /// See [`BoolRules::null_values`].
    pub null_values: Option<Disposition<bool>>,
    /// See [`BoolRules::nan_values`].
    pub nan_values: Option<Disposition<bool>>,
    /// See [`BoolRules::undefined_values`].
    pub undefined_values: Option<Disposition<bool>>,
    /// See [`BoolRules::trim_strings`].
    pub trim_strings: Option<bool>,
    /// See [`BoolRules::lower_strings`].
    pub lower_strings: Option<bool>,
    /// See [`BoolRules::false_strings`].
    pub false_strings: Option<Option<Vec<String>>>,
    /// See [`BoolRules::true_strings`].
    pub true_strings: Option<Option<Vec<String>>>,
}

fn normalize(text: &str, trim: bool, lower: bool) -> String {
    let text = if trim { text.trim() } else { text };
    if lower {
        text.to_lowercase()
    } else {
        text.to_string()
    }
}

fn normalize_list(list: Option<Vec<String>>, trim: bool, lower: bool) -> Option<Vec<String>> {
    list.map(|words| {
        words
            .iter()
            .map(|word| normalize(word, trim, lower))
            .collect()
    })
}

impl RuleSet for BoolRules {
    type Overrides = BoolOverrides;

    const DOMAIN: &'static str = "boolean";

    const KEYS: &'static [&'static str] = &[
        "default",
        "nullValues",
        "nanValues",
        "undefinedValues",
        "trimStrings",
        "lowerStrings",
        "falseStrings",
        "trueStrings",
    ];

    fn resolve(&self, local: &BoolOverrides) -> Self {
        Self {
            default: resolve(&local.default, &self.default),
            null_values: resolve(&local.null_values, &self.null_values),
            nan_values: resolve(&local.nan_values, &self.nan_values),
            undefined_values: resolve(&local.undefined_values, &self.undefined_values),
            trim_strings: resolve(&local.trim_strings, &self.trim_strings),
            lower_strings: resolve(&local.lower_strings, &self.lower_strings),
            false_strings: resolve(&local.false_strings, &self.false_strings),
            true_strings: resolve(&local.true_strings, &self.true_strings),
        }
    }

    /// Word lists in the update are normalized with the trim and lowercase
    /// flags that hold once the update is applied.
    fn apply(&mut self, update: BoolOverrides) {
        let trim = update.trim_strings.unwrap_or(self.trim_strings);
        let lower = update.lower_strings.unwrap_or(self.lower_strings);

        if let Some(default) = update.default {
            self.default = default;
        }
        if let Some(null_values) = update.null_values {
            self.null_values = null_values;
        }
        if let Some(nan_values) = update.nan_values {
            self.nan_values = nan_values;
        }
        if let Some(undefined_values) = update.undefined_values {
            self.undefined_values = undefined_values;
        }
        self.trim_strings = trim;
        self.lower_strings = lower;
        if let Some(false_strings) = update.false_strings {
            self.false_strings = normalize_list(false_strings, trim, lower);
        }
        if let Some(true_strings) = update.true_strings {
            self.true_strings = normalize_list(true_strings, trim, lower);
        }
    }

    fn parse_key(key: &str, value: &Value, update: &mut BoolOverrides) -> Result<(), RuleError> {
        const DOMAIN: &str = BoolRules::DOMAIN;
        const DISPOSITION: &str = "a boolean, \"default\" or \"error\"";

        match key {
            "default" => {
                update.default = Some(rules::parse_fallback(
                    DOMAIN,
                    key,
                    value,
                    Value::as_bool,
                    "a boolean or \"error\"",
                )?)
            }
            "nullValues" => {
                update.null_values = Some(rules::parse_disposition(
                    DOMAIN,
                    key,
                    value,
                    Value::as_bool,
                    DISPOSITION,
                )?)
            }
            "nanValues" => {
                update.nan_values = Some(rules::parse_disposition(
                    DOMAIN,
                    key,
                    value,
                    Value::as_bool,
                    DISPOSITION,
                )?)
            }
            "undefinedValues" => {
                update.undefined_values = Some(rules::parse_disposition(
                    DOMAIN,
                    key,
                    value,
                    Value::as_bool,
                    DISPOSITION,
                )?)
            }
            "trimStrings" => update.trim_strings = Some(rules::parse_bool(DOMAIN, key, value)?),
            "lowerStrings" => update.lower_strings = Some(rules::parse_bool(DOMAIN, key, value)?),
            "falseStrings" => {
                update.false_strings = Some(rules::parse_string_list(DOMAIN, key, value)?)
            }
            "trueStrings" => {
                update.true_strings = Some(rules::parse_string_list(DOMAIN, key, value)?)
            }
            _ => {}
        }
        Ok(())
    }
}

/// Converts untyped input into a `bool`.
///
/// # Examples
///
/// ```
/// use scalar_sanitize::{BoolSanitizer, Sanitizer};
///
/// let sanitizer = BoolSanitizer::default();
/// assert_eq!(sanitizer.sanitize("\tTrue"), Ok(true));
/// assert_eq!(sanitizer.sanitize("no"), Ok(false));
/// assert_eq!(sanitizer.sanitize(Option::<bool>::None), Ok(false));
/// ```
#[derive(Debug, Clone, Default)]
pub struct BoolSanitizer {
    rules: Arc<BoolRules>,
}

impl BoolSanitizer {
    /// Creates a sanitizer with fixed rules.
    pub fn new(rules: BoolRules) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    /// Creates a sanitizer from the current process-wide rules.
    pub fn global() -> Self {
        Self {
            rules: store::BOOLEAN.snapshot(),
        }
    }

    /// Returns a sanitizer whose rules are these rules overridden by `local`.
    pub fn with_overrides(&self, local: &BoolOverrides) -> Self {
        Self::new(self.rules.resolve(local))
    }

    /// Returns the effective rules.
    pub fn rules(&self) -> &BoolRules {
        &self.rules
    }

    fn match_words(&self, text: &str) -> Option<bool> {
        let listed = |list: &Option<Vec<String>>| {
            list.as_ref()
                .is_some_and(|words| words.iter().any(|word| word == text))
        };
        let rules = &self.rules;
        let in_true = listed(&rules.true_strings);
        let in_false = listed(&rules.false_strings);

        if in_true || (rules.true_strings.is_none() && !in_false) {
            Some(true)
        } else if in_false || rules.false_strings.is_none() {
            Some(false)
        } else {
            None
        }
    }

    fn not_a_number(&self, field: Option<&str>) -> Result<bool, SanitizeError> {
        trace!(rule = "nanValues", "boolean input is not a number");
        self.rules.nan_values.dispatch(&self.rules.default, || {
            SanitizeError::new(ErrorKind::NanValue).with_field(field)
        })
    }
}

impl Sanitizer for BoolSanitizer {
    type Output = bool;

    fn sanitize_with(&self, input: Input, field: Option<&str>) -> Result<bool, SanitizeError> {
        let rules = &self.rules;
        match input {
            Input::Bool(value) => Ok(value),
            Input::Str(text) => {
                let text = normalize(&text, rules.trim_strings, rules.lower_strings);
                if let Some(value) = self.match_words(&text) {
                    return Ok(value);
                }
                if numeric::is_numeric_text(&text) {
                    rules.default.or_fail(|| {
                        SanitizeError::new(ErrorKind::UnexpectedValue)
                            .with_field(field)
                            .with_value(text.as_str())
                    })
                } else {
                    self.not_a_number(field)
                }
            }
            Input::Missing => rules.undefined_values.dispatch(&rules.default, || {
                SanitizeError::new(ErrorKind::UndefinedValue).with_field(field)
            }),
            Input::Null => rules.null_values.dispatch(&rules.default, || {
                SanitizeError::new(ErrorKind::NullValue).with_field(field)
            }),
            Input::Number(n) if n.is_nan() => self.not_a_number(field),
            Input::Other(ref text) if !numeric::is_numeric_structure(text) => {
                self.not_a_number(field)
            }
            Input::Number(_) | Input::Other(_) => rules.default.or_fail(|| {
                SanitizeError::new(ErrorKind::UnexpectedValue)
                    .with_field(field)
                    .with_value(input.to_string())
            }),
        }
    }
}

/// Sanitizes `input` with the process-wide rules overridden by `local`.
///
/// # Errors
///
/// Returns a [`SanitizeError`] when a rule set to `error` is triggered.
pub fn sanitize(
    input: impl Into<Input>,
    local: Option<&BoolOverrides>,
    field: Option<&str>,
) -> Result<bool, SanitizeError> {
    let global = BoolSanitizer::global();
    match local {
        Some(local) => global.with_overrides(local).sanitize_with(input.into(), field),
        None => global.sanitize_with(input.into(), field),
    }
}
