//! Integer coercion: signed, unsigned and ranged.
//!
//! All three share one rule set and one parsing pipeline. Text is read as a
//! decimal number (the longest numeric prefix, or the whole string in strict
//! mode), numbers are rounded half away from zero, and `NaN` and the
//! infinities are routed through their own rules. The unsigned and ranged
//! coercers post-process the signed result.
//!
//! Results are `Option<i64>`: `None` is only produced when `nan_values` is
//! [`NanValues::Allow`].

use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use crate::error::{ErrorKind, RuleError, SanitizeError};
use crate::input::Input;
use crate::numeric::{self, MAX_SAFE_INTEGER, MIN_SAFE_INTEGER};
use crate::rules::{self, resolve, Disposition, Fallback, RuleSet};
use crate::sanitizer::Sanitizer;
use crate::store;

/// What to do when the input is not a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NanValues {
    /// Let it through as `None`.
    Allow,
    /// Substitute this value.
    Replace(i64),
    /// Defer to the `default` rule.
    UseDefault,
    /// Raise [`ErrorKind::NanValue`].
    Fail,
}

/// What to do with positive or negative infinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfiniteValues {
    /// Clamp to the largest or smallest safe integer.
    Clamp,
    /// Substitute this value.
    Replace(i64),
    /// Defer to the `default` rule.
    UseDefault,
    /// Raise [`ErrorKind::InfiniteValue`].
    Fail,
}

/// What the unsigned coercer does with negative results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignedValues {
    /// Substitute this value.
    Replace(i64),
    /// Drop the sign.
    Abs,
    /// Defer to the `default` rule.
    UseDefault,
    /// Raise [`ErrorKind::NegativeValue`].
    Fail,
}

/// What the ranged coercer does with results outside its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutOfRangeValues {
    /// Clamp to the nearest bound.
    Clamp,
    /// Substitute this value.
    Replace(i64),
    /// Defer to the `default` rule.
    UseDefault,
    /// Raise [`ErrorKind::OutOfRangeValue`].
    Fail,
}

/// Integer sanitizer rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerRules {
    /// Value for input that cannot be parsed. Default `0`.
    pub default: Fallback<i64>,
    /// Null input. Default: use `default`.
    pub null_values: Disposition<i64>,
    /// Input that parses to `NaN`. Default: use `default`.
    pub nan_values: NanValues,
    /// Input that parses to an infinity. Default: clamp.
    pub infinite_values: InfiniteValues,
    /// Missing input. Default: use `default`.
    pub undefined_values: Disposition<i64>,
    /// Trim strings before parsing. Default `true`.
    pub trim_strings: bool,
    /// Require strings to be entirely a decimal number. Default `false`.
    pub strict_strings: bool,
    /// Negative results of the unsigned coercer. Default: replace with `0`.
    pub signed_values: SignedValues,
    /// Out of range results of the ranged coercer. Default: clamp.
    pub out_of_range_values: OutOfRangeValues,
}

impl Default for IntegerRules {
    fn default() -> Self {
        Self {
            default: Fallback::Value(0),
            null_values: Disposition::UseDefault,
            nan_values: NanValues::UseDefault,
            infinite_values: InfiniteValues::Clamp,
            undefined_values: Disposition::UseDefault,
            trim_strings: true,
            strict_strings: false,
            signed_values: SignedValues::Replace(0),
            out_of_range_values: OutOfRangeValues::Clamp,
        }
    }
}

/// Partial [`IntegerRules`]; `None` keeps the underlying value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegerOverrides {
    /// See [`IntegerRules::default`].
    pub default: Option<Fallback<i64>>,
    /// See [`IntegerRules::null_values`].
    pub null_values: Option<Disposition<i64>>,
    /// See [`IntegerRules::nan_values`].
    pub nan_values: Option<NanValues>,
    /// See [`IntegerRules::infinite_values`].
    pub infinite_values: Option<InfiniteValues>,
    /// See [`IntegerRules::undefined_values`].
    pub undefined_values: Option<Disposition<i64>>,
    /// See [`IntegerRules::trim_strings`].
    pub trim_strings: Option<bool>,
    /// See [`IntegerRules::strict_strings`].
    pub strict_strings: Option<bool>,
    /// See [`IntegerRules::signed_values`].
    pub signed_values: Option<SignedValues>,
    /// See [`IntegerRules::out_of_range_values`].
    pub out_of_range_values: Option<OutOfRangeValues>,
}

impl RuleSet for IntegerRules {
    type Overrides = IntegerOverrides;

    const DOMAIN: &'static str = "integer";

    const KEYS: &'static [&'static str] = &[
        "default",
        "nullValues",
        "nanValues",
        "infiniteValues",
        "undefinedValues",
        "trimStrings",
        "strictStrings",
        "signedValues",
        "outOfRangeValues",
    ];

    fn resolve(&self, local: &IntegerOverrides) -> Self {
        Self {
            default: resolve(&local.default, &self.default),
            null_values: resolve(&local.null_values, &self.null_values),
            nan_values: resolve(&local.nan_values, &self.nan_values),
            infinite_values: resolve(&local.infinite_values, &self.infinite_values),
            undefined_values: resolve(&local.undefined_values, &self.undefined_values),
            trim_strings: resolve(&local.trim_strings, &self.trim_strings),
            strict_strings: resolve(&local.strict_strings, &self.strict_strings),
            signed_values: resolve(&local.signed_values, &self.signed_values),
            out_of_range_values: resolve(&local.out_of_range_values, &self.out_of_range_values),
        }
    }

    fn apply(&mut self, update: IntegerOverrides) {
        *self = self.resolve(&update);
    }

    fn parse_key(
        key: &str,
        value: &Value,
        update: &mut IntegerOverrides,
    ) -> Result<(), RuleError> {
        const DOMAIN: &str = IntegerRules::DOMAIN;
        let bad = |expected| rules::invalid(DOMAIN, key, expected);
        let token = value.as_str();
        let number = rules::json_integer(value);

        match key {
            "default" => {
                update.default = Some(rules::parse_fallback(
                    DOMAIN,
                    key,
                    value,
                    rules::json_integer,
                    "a number or \"error\"",
                )?)
            }
            "nullValues" | "undefinedValues" => {
                let disposition = rules::parse_disposition(
                    DOMAIN,
                    key,
                    value,
                    rules::json_integer,
                    "a number, \"default\" or \"error\"",
                )?;
                if key == "nullValues" {
                    update.null_values = Some(disposition);
                } else {
                    update.undefined_values = Some(disposition);
                }
            }
            "nanValues" => {
                update.nan_values = Some(match (token, number) {
                    (Some("allow"), _) => NanValues::Allow,
                    (Some("default"), _) => NanValues::UseDefault,
                    (Some("error"), _) => NanValues::Fail,
                    (None, Some(n)) => NanValues::Replace(n),
                    _ => return Err(bad("a number, \"allow\", \"default\" or \"error\"")),
                })
            }
            "infiniteValues" => {
                update.infinite_values = Some(match (token, number) {
                    (Some("clamp"), _) => InfiniteValues::Clamp,
                    (Some("default"), _) => InfiniteValues::UseDefault,
                    (Some("error"), _) => InfiniteValues::Fail,
                    (None, Some(n)) => InfiniteValues::Replace(n),
                    _ => return Err(bad("a number, \"clamp\", \"default\" or \"error\"")),
                })
            }
            "signedValues" => {
                update.signed_values = Some(match (token, number) {
                    (Some("abs"), _) => SignedValues::Abs,
                    (Some("default"), _) => SignedValues::UseDefault,
                    (Some("error"), _) => SignedValues::Fail,
                    (None, Some(n)) => SignedValues::Replace(n),
                    _ => return Err(bad("a number, \"abs\", \"default\" or \"error\"")),
                })
            }
            "outOfRangeValues" => {
                update.out_of_range_values = Some(match (token, number) {
                    (Some("clamp"), _) => OutOfRangeValues::Clamp,
                    (Some("default"), _) => OutOfRangeValues::UseDefault,
                    (Some("error"), _) => OutOfRangeValues::Fail,
                    (None, Some(n)) => OutOfRangeValues::Replace(n),
                    _ => return Err(bad("a number, \"clamp\", \"default\" or \"error\"")),
                })
            }
            "trimStrings" => update.trim_strings = Some(rules::parse_bool(DOMAIN, key, value)?),
            "strictStrings" => {
                update.strict_strings = Some(rules::parse_bool(DOMAIN, key, value)?)
            }
            _ => {}
        }
        Ok(())
    }
}

fn error(kind: ErrorKind, field: Option<&str>) -> SanitizeError {
    SanitizeError::new(kind).with_field(field)
}

/// The shared signed pipeline. `default` stands in for `rules.default`.
fn coerce_signed(
    rules: &IntegerRules,
    default: &Fallback<i64>,
    input: Input,
    field: Option<&str>,
) -> Result<Option<i64>, SanitizeError> {
    let number = match &input {
        Input::Missing => {
            return rules
                .undefined_values
                .dispatch(default, || error(ErrorKind::UndefinedValue, field))
                .map(Some)
        }
        Input::Null => {
            return rules
                .null_values
                .dispatch(default, || error(ErrorKind::NullValue, field))
                .map(Some)
        }
        Input::Number(n) => *n,
        Input::Str(text) => {
            let text = if rules.trim_strings {
                text.trim()
            } else {
                text.as_str()
            };
            if rules.strict_strings && !numeric::is_decimal(text) {
                return Err(error(ErrorKind::UnexpectedValue, field).with_value(text));
            }
            numeric::parse_number_prefix(text)
        }
        Input::Bool(_) | Input::Other(_) => {
            trace!(input = input.type_name(), "integer input falls back to default");
            return default
                .or_fail(|| error(ErrorKind::UnexpectedValue, field).with_value(input.to_string()))
                .map(Some);
        }
    };

    if number.is_nan() {
        trace!(rule = "nanValues", "integer input is not a number");
        return match rules.nan_values {
            NanValues::Allow => Ok(None),
            NanValues::Replace(value) => Ok(Some(value)),
            NanValues::UseDefault => default
                .or_fail(|| error(ErrorKind::NanValue, field))
                .map(Some),
            NanValues::Fail => Err(error(ErrorKind::NanValue, field)),
        };
    }

    if number.is_infinite() {
        trace!(rule = "infiniteValues", "integer input is infinite");
        return match rules.infinite_values {
            InfiniteValues::Clamp if number > 0.0 => Ok(Some(MAX_SAFE_INTEGER)),
            InfiniteValues::Clamp => Ok(Some(MIN_SAFE_INTEGER)),
            InfiniteValues::Replace(value) => Ok(Some(value)),
            InfiniteValues::UseDefault => default
                .or_fail(|| error(ErrorKind::InfiniteValue, field))
                .map(Some),
            InfiniteValues::Fail => Err(error(ErrorKind::InfiniteValue, field)),
        };
    }

    Ok(Some(numeric::to_safe_integer(number)))
}

/// Converts untyped input into a signed integer.
///
/// # Examples
///
/// ```
/// use scalar_sanitize::{Sanitizer, SignedSanitizer};
///
/// let sanitizer = SignedSanitizer::default();
/// assert_eq!(sanitizer.sanitize(" -42 "), Ok(Some(-42)));
/// assert_eq!(sanitizer.sanitize(2.5), Ok(Some(3)));
/// assert_eq!(sanitizer.sanitize("abc"), Ok(Some(0)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SignedSanitizer {
    rules: Arc<IntegerRules>,
}

/// Converts untyped input into an integer that is zero or positive.
///
/// # Examples
///
/// ```
/// use scalar_sanitize::{IntegerOverrides, Sanitizer, SignedValues, UnsignedSanitizer};
///
/// let sanitizer = UnsignedSanitizer::default();
/// assert_eq!(sanitizer.sanitize(-12), Ok(Some(0)));
///
/// let abs = sanitizer.with_overrides(&IntegerOverrides {
///     signed_values: Some(SignedValues::Abs),
///     ..Default::default()
/// });
/// assert_eq!(abs.sanitize(-12), Ok(Some(12)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct UnsignedSanitizer {
    rules: Arc<IntegerRules>,
}

/// Inclusive integer bounds with `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntRange {
    min: i64,
    max: i64,
}

impl IntRange {
    /// Creates the range `[min, max]`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidRange`] if `min > max`.
    pub fn new(min: i64, max: i64) -> Result<Self, RuleError> {
        if min > max {
            return Err(RuleError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Lower bound.
    pub fn min(&self) -> i64 {
        self.min
    }

    /// Upper bound.
    pub fn max(&self) -> i64 {
        self.max
    }

    /// Returns `true` if `value` lies within the bounds.
    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Converts untyped input into an integer within `[min, max]`.
///
/// Input that cannot be read falls back to `min`, not to the `default` rule.
/// A default given with [`RangedSanitizer::with_default`] or a `default`
/// override replaces `min`. A `default` rule of `error` still fails.
///
/// # Examples
///
/// ```
/// use scalar_sanitize::{Fallback, IntRange, RangedSanitizer, Sanitizer};
///
/// let rating = RangedSanitizer::new(Default::default(), IntRange::new(1, 5)?);
/// assert_eq!(rating.sanitize("250"), Ok(Some(5)));
/// assert_eq!(rating.sanitize(-1), Ok(Some(1)));
/// assert_eq!(rating.sanitize("none"), Ok(Some(1)));
/// assert_eq!(rating.with_default(Fallback::Value(3)).sanitize("none"), Ok(Some(3)));
/// # Ok::<(), scalar_sanitize::RuleError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RangedSanitizer {
    rules: Arc<IntegerRules>,
    range: IntRange,
    default: Option<Fallback<i64>>,
}

macro_rules! integer_constructors {
    ($name:ident) => {
        impl $name {
            /// Creates a sanitizer with fixed rules.
            pub fn new(rules: IntegerRules) -> Self {
                Self {
                    rules: Arc::new(rules),
                }
            }

            /// Creates a sanitizer from the current process-wide rules.
            pub fn global() -> Self {
                Self {
                    rules: store::INTEGER.snapshot(),
                }
            }

            /// Returns a sanitizer whose rules are these rules overridden by `local`.
            pub fn with_overrides(&self, local: &IntegerOverrides) -> Self {
                Self::new(self.rules.resolve(local))
            }

            /// Returns the effective rules.
            pub fn rules(&self) -> &IntegerRules {
                &self.rules
            }
        }
    };
}

integer_constructors!(SignedSanitizer);
integer_constructors!(UnsignedSanitizer);

impl RangedSanitizer {
    /// Creates a sanitizer with fixed rules and bounds.
    pub fn new(rules: IntegerRules, range: IntRange) -> Self {
        Self {
            rules: Arc::new(rules),
            range,
            default: None,
        }
    }

    /// Creates a sanitizer from the current process-wide rules.
    pub fn global(range: IntRange) -> Self {
        Self {
            rules: store::INTEGER.snapshot(),
            range,
            default: None,
        }
    }

    /// Returns a sanitizer whose rules are these rules overridden by `local`.
    ///
    /// A `default` in `local` replaces the lower bound as the fallback.
    pub fn with_overrides(&self, local: &IntegerOverrides) -> Self {
        Self {
            rules: Arc::new(self.rules.resolve(local)),
            range: self.range,
            default: local.default.clone().or_else(|| self.default.clone()),
        }
    }

    /// Returns a sanitizer that falls back to `default` instead of the lower bound.
    pub fn with_default(mut self, default: Fallback<i64>) -> Self {
        self.default = Some(default);
        self
    }

    /// Returns the value used wherever the `default` rule applies.
    pub fn fallback(&self) -> Fallback<i64> {
        match (&self.default, &self.rules.default) {
            (Some(default), _) => default.clone(),
            (None, Fallback::Fail) => Fallback::Fail,
            (None, Fallback::Value(_)) => Fallback::Value(self.range.min),
        }
    }

    /// Returns the effective rules.
    pub fn rules(&self) -> &IntegerRules {
        &self.rules
    }

    /// Returns the accepted bounds.
    pub fn range(&self) -> IntRange {
        self.range
    }
}

impl Sanitizer for SignedSanitizer {
    type Output = Option<i64>;

    fn sanitize_with(
        &self,
        input: Input,
        field: Option<&str>,
    ) -> Result<Option<i64>, SanitizeError> {
        coerce_signed(&self.rules, &self.rules.default, input, field)
    }
}

impl Sanitizer for UnsignedSanitizer {
    type Output = Option<i64>;

    fn sanitize_with(
        &self,
        input: Input,
        field: Option<&str>,
    ) -> Result<Option<i64>, SanitizeError> {
        let rules = &self.rules;
        let value = match coerce_signed(rules, &rules.default, input, field)? {
            Some(value) if value < 0 => value,
            other => return Ok(other),
        };

        trace!(rule = "signedValues", value, "unsigned input is negative");
        let negative = || error(ErrorKind::NegativeValue, field).with_value(value.to_string());
        match rules.signed_values {
            SignedValues::Replace(replacement) => Ok(Some(replacement)),
            SignedValues::Abs => Ok(Some(value.saturating_neg())),
            SignedValues::UseDefault => rules.default.or_fail(negative).map(Some),
            SignedValues::Fail => Err(negative()),
        }
    }
}

impl Sanitizer for RangedSanitizer {
    type Output = Option<i64>;

    fn sanitize_with(
        &self,
        input: Input,
        field: Option<&str>,
    ) -> Result<Option<i64>, SanitizeError> {
        let rules = &self.rules;
        let default = self.fallback();
        let value = match coerce_signed(rules, &default, input, field)? {
            Some(value) if !self.range.contains(value) => value,
            other => return Ok(other),
        };

        trace!(rule = "outOfRangeValues", value, "ranged input is out of range");
        let out_of_range =
            || error(ErrorKind::OutOfRangeValue, field).with_value(value.to_string());
        match rules.out_of_range_values {
            OutOfRangeValues::Clamp => Ok(Some(value.clamp(self.range.min, self.range.max))),
            OutOfRangeValues::Replace(replacement) => Ok(Some(replacement)),
            OutOfRangeValues::UseDefault => default.or_fail(out_of_range).map(Some),
            OutOfRangeValues::Fail => Err(out_of_range()),
        }
    }
}

fn global_with(local: Option<&IntegerOverrides>) -> Arc<IntegerRules> {
    let global = store::INTEGER.snapshot();
    match local {
        Some(local) => Arc::new(global.resolve(local)),
        None => global,
    }
}

/// Sanitizes a signed integer with the process-wide rules overridden by `local`.
///
/// # Errors
///
/// Returns a [`SanitizeError`] when a rule set to `error` is triggered.
pub fn signed(
    input: impl Into<Input>,
    local: Option<&IntegerOverrides>,
    field: Option<&str>,
) -> Result<Option<i64>, SanitizeError> {
    SignedSanitizer {
        rules: global_with(local),
    }
    .sanitize_with(input.into(), field)
}

/// Sanitizes an unsigned integer with the process-wide rules overridden by `local`.
///
/// # Errors
///
/// Returns a [`SanitizeError`] when a rule set to `error` is triggered.
pub fn unsigned(
    input: impl Into<Input>,
    local: Option<&IntegerOverrides>,
    field: Option<&str>,
) -> Result<Option<i64>, SanitizeError> {
    UnsignedSanitizer {
        rules: global_with(local),
    }
    .sanitize_with(input.into(), field)
}

/// Sanitizes an integer within `range` with the process-wide rules overridden by `local`.
///
/// Unreadable input falls back to `range.min()` unless `local` sets a `default`.
///
/// # Errors
///
/// Returns a [`SanitizeError`] when a rule set to `error` is triggered.
pub fn ranged(
    input: impl Into<Input>,
    range: IntRange,
    local: Option<&IntegerOverrides>,
    field: Option<&str>,
) -> Result<Option<i64>, SanitizeError> {
    RangedSanitizer {
        rules: global_with(local),
        range,
        default: local.and_then(|local| local.default.clone()),
    }
    .sanitize_with(input.into(), field)
}
