//! Enumeration coercion: map input onto one of a fixed list of candidates.
//!
//! The result is always an element of the candidate list, never the input
//! itself, so `" ADMIN "` against `["admin", "user"]` yields the candidate
//! `"admin"`.

use std::sync::Arc;

use serde_json::Value;
use tracing::{trace, warn};

use crate::error::{ErrorKind, RuleError, SanitizeError};
use crate::input::Input;
use crate::rules::{self, resolve, RuleSet};
use crate::sanitizer::Sanitizer;
use crate::store;

/// A value that can appear in a candidate list.
///
/// `to_input` gives the form input is compared against; `null` is the value
/// returned for null input when `allow_null` is set, for types that have one.
pub trait Candidate: Clone {
    /// Returns the comparable form of this candidate.
    fn to_input(&self) -> Input;

    /// Returns this type's null value, if it has one.
    fn null() -> Option<Self> {
        None
    }
}

impl Candidate for &str {
    fn to_input(&self) -> Input {
        Input::Str((*self).to_string())
    }
}

impl Candidate for String {
    fn to_input(&self) -> Input {
        Input::Str(self.clone())
    }
}

impl Candidate for bool {
    fn to_input(&self) -> Input {
        Input::Bool(*self)
    }
}

impl Candidate for Input {
    fn to_input(&self) -> Input {
        self.clone()
    }

    fn null() -> Option<Self> {
        Some(Input::Null)
    }
}

impl<C: Candidate> Candidate for Option<C> {
    fn to_input(&self) -> Input {
        self.as_ref().map_or(Input::Null, C::to_input)
    }

    fn null() -> Option<Self> {
        Some(None)
    }
}

macro_rules! number_candidate {
    ($($t:ty),*) => {
        $(
            impl Candidate for $t {
                fn to_input(&self) -> Input {
                    Input::from(*self)
                }
            }
        )*
    };
}

number_candidate!(i8, i16, i32, i64, u8, u16, u32, u64, f64);

/// Enumeration sanitizer rules.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumRules {
    /// Return null for null input when the candidate type has a null. Default `false`.
    pub allow_null: bool,
    /// Trim string input before matching. Default `true`.
    pub trim_strings: bool,
    /// Compare strings case-sensitively. Default `false`.
    pub case_sensitive: bool,
    /// Input whose matching candidate is returned instead of failing. Default none.
    ///
    /// It is matched against the candidates with the other rules. A default
    /// given to the sanitizer itself takes precedence.
    pub default: Option<Input>,
}

impl Default for EnumRules {
    fn default() -> Self {
        Self {
            allow_null: false,
            trim_strings: true,
            case_sensitive: false,
            default: None,
        }
    }
}

/// Partial [`EnumRules`]; `None` keeps the underlying value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumOverrides {
    /// See [`EnumRules::allow_null`].
    pub allow_null: Option<bool>,
    /// See [`EnumRules::trim_strings`].
    pub trim_strings: Option<bool>,
    /// See [`EnumRules::case_sensitive`].
    pub case_sensitive: Option<bool>,
    /// See [`EnumRules::default`].
    pub default: Option<Option<Input>>,
}

impl RuleSet for EnumRules {
    type Overrides = EnumOverrides;

    const DOMAIN: &'static str = "enumeration";

    const KEYS: &'static [&'static str] =
        &["allowNull", "trimStrings", "caseSensitive", "default"];

    fn resolve(&self, local: &EnumOverrides) -> Self {
        Self {
            allow_null: resolve(&local.allow_null, &self.allow_null),
            trim_strings: resolve(&local.trim_strings, &self.trim_strings),
            case_sensitive: resolve(&local.case_sensitive, &self.case_sensitive),
            default: resolve(&local.default, &self.default),
        }
    }

    fn apply(&mut self, update: EnumOverrides) {
        *self = self.resolve(&update);
    }

    /// A `null` default clears it; any other JSON value becomes the default input.
    fn parse_key(key: &str, value: &Value, update: &mut EnumOverrides) -> Result<(), RuleError> {
        let flag = || rules::parse_bool(Self::DOMAIN, key, value);
        match key {
            "allowNull" => update.allow_null = Some(flag()?),
            "trimStrings" => update.trim_strings = Some(flag()?),
            "caseSensitive" => update.case_sensitive = Some(flag()?),
            "default" => update.default = Some((!value.is_null()).then(|| Input::from(value))),
            _ => {}
        }
        Ok(())
    }
}

/// Maps input onto one of a borrowed list of candidates.
///
/// # Examples
///
/// ```
/// use scalar_sanitize::{EnumOverrides, EnumSanitizer, ErrorKind, Input, Sanitizer};
///
/// let roles = ["admin", "editor", "viewer"];
/// let sanitizer = EnumSanitizer::new(&roles, Default::default());
///
/// assert_eq!(sanitizer.sanitize(" Editor "), Ok("editor"));
/// assert_eq!(
///     sanitizer.sanitize("root").unwrap_err().kind(),
///     ErrorKind::EnumValue
/// );
///
/// let configured = sanitizer.with_overrides(&EnumOverrides {
///     default: Some(Some(Input::from("VIEWER"))),
///     ..Default::default()
/// });
/// assert_eq!(configured.sanitize("root"), Ok("viewer"));
///
/// let lenient = sanitizer.with_default("viewer");
/// assert_eq!(lenient.sanitize("root"), Ok("viewer"));
/// ```
#[derive(Debug, Clone)]
pub struct EnumSanitizer<'a, T> {
    candidates: &'a [T],
    rules: Arc<EnumRules>,
    default: Option<T>,
}

impl<'a, T: Candidate> EnumSanitizer<'a, T> {
    /// Creates a sanitizer over `candidates` with fixed rules and no default.
    pub fn new(candidates: &'a [T], rules: EnumRules) -> Self {
        Self {
            candidates,
            rules: Arc::new(rules),
            default: None,
        }
    }

    /// Creates a sanitizer over `candidates` from the current process-wide rules.
    pub fn global(candidates: &'a [T]) -> Self {
        Self {
            candidates,
            rules: store::ENUMERATION.snapshot(),
            default: None,
        }
    }

    /// Returns a sanitizer whose rules are these rules overridden by `local`.
    pub fn with_overrides(&self, local: &EnumOverrides) -> Self {
        Self {
            candidates: self.candidates,
            rules: Arc::new(self.rules.resolve(local)),
            default: self.default.clone(),
        }
    }

    /// Returns a sanitizer that yields `default` instead of failing.
    ///
    /// Takes precedence over [`EnumRules::default`].
    pub fn with_default(mut self, default: T) -> Self {
        self.default = Some(default);
        self
    }

    /// Returns the effective rules.
    pub fn rules(&self) -> &EnumRules {
        &self.rules
    }

    /// Returns the candidate list.
    pub fn candidates(&self) -> &'a [T] {
        self.candidates
    }

    fn find(&self, input: &Input) -> Option<T> {
        if let (Input::Str(text), false) = (input, self.rules.case_sensitive) {
            let text = text.to_lowercase();
            return self
                .candidates
                .iter()
                .find(|candidate| match candidate.to_input() {
                    Input::Str(option) => option.to_lowercase() == text,
                    _ => false,
                })
                .cloned();
        }
        self.candidates
            .iter()
            .find(|candidate| candidate.to_input() == *input)
            .cloned()
    }

    fn prepare(&self, input: Input) -> Input {
        match input {
            Input::Str(text) if self.rules.trim_strings => Input::Str(text.trim().to_string()),
            other => other,
        }
    }

    /// The sanitizer's own default, else the candidate the rules' default names.
    fn fallback(&self) -> Option<T> {
        if let Some(default) = &self.default {
            return Some(default.clone());
        }
        let configured = self.rules.default.as_ref()?;
        let found = self.find(&self.prepare(configured.clone()));
        if found.is_none() {
            warn!(default = %configured, "enumeration default matches no candidate");
        }
        found
    }

    fn rendered_candidates(&self) -> Vec<String> {
        self.candidates
            .iter()
            .map(|candidate| candidate.to_input().to_string())
            .collect()
    }
}

impl<T: Candidate> Sanitizer for EnumSanitizer<'_, T> {
    type Output = T;

    fn sanitize_with(&self, input: Input, field: Option<&str>) -> Result<T, SanitizeError> {
        if input == Input::Null {
            if let Some(null) = self.find(&Input::Null) {
                return Ok(null);
            }
            if self.rules.allow_null {
                if let Some(null) = T::null() {
                    return Ok(null);
                }
            }
            return self
                .fallback()
                .ok_or_else(|| SanitizeError::new(ErrorKind::NullValue).with_field(field));
        }

        let input = self.prepare(input);

        if let Some(found) = self.find(&input) {
            return Ok(found);
        }

        trace!(
            candidates = self.candidates.len(),
            "enumeration input matches no candidate"
        );
        self.fallback().ok_or_else(|| {
            SanitizeError::new(ErrorKind::EnumValue)
                .with_field(field)
                .with_value(input.to_string())
                .with_candidates(self.rendered_candidates())
        })
    }
}

/// Maps `input` onto one of `candidates` with the process-wide rules
/// overridden by `local`, falling back to `default` when given.
///
/// # Errors
///
/// Returns [`ErrorKind::NullValue`] for unaccepted null input and
/// [`ErrorKind::EnumValue`] when nothing matches and no default is given.
pub fn one_of<T: Candidate>(
    input: impl Into<Input>,
    candidates: &[T],
    local: Option<&EnumOverrides>,
    default: Option<T>,
    field: Option<&str>,
) -> Result<T, SanitizeError> {
    let mut sanitizer = EnumSanitizer::global(candidates);
    if let Some(local) = local {
        sanitizer = sanitizer.with_overrides(local);
    }
    if let Some(default) = default {
        sanitizer = sanitizer.with_default(default);
    }
    sanitizer.sanitize_with(input.into(), field)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLOURS: [&str; 3] = ["Red", "green", "BLUE"];

    fn colours() -> EnumSanitizer<'static, &'static str> {
        EnumSanitizer::new(&COLOURS, EnumRules::default())
    }

    #[test]
    fn returns_the_candidate_not_the_input() {
        assert_eq!(colours().sanitize("red"), Ok("Red"));
        assert_eq!(colours().sanitize("  blue\n"), Ok("BLUE"));
    }

    #[test]
    fn matching_is_case_insensitive_by_default() {
        let fruit = ["Apple", "Pear"];
        let sanitizer = EnumSanitizer::new(&fruit, EnumRules::default());
        assert_eq!(sanitizer.sanitize("apple"), Ok("Apple"));

        let strict = sanitizer.with_overrides(&EnumOverrides {
            case_sensitive: Some(true),
            ..Default::default()
        });
        assert_eq!(
            strict.sanitize("apple").unwrap_err().kind(),
            ErrorKind::EnumValue
        );
    }

    #[test]
    fn case_sensitive_matching() {
        let sanitizer = colours().with_overrides(&EnumOverrides {
            case_sensitive: Some(true),
            ..Default::default()
        });
        assert_eq!(sanitizer.sanitize("green"), Ok("green"));
        assert_eq!(
            sanitizer.sanitize("GREEN").unwrap_err().kind(),
            ErrorKind::EnumValue
        );
    }

    #[test]
    fn untrimmed_input_does_not_match_when_trimming_is_off() {
        let sanitizer = colours().with_overrides(&EnumOverrides {
            trim_strings: Some(false),
            ..Default::default()
        });
        assert!(sanitizer.sanitize(" red").is_err());
    }

    #[test]
    fn mismatch_reports_candidates_and_value() {
        let error = colours().sanitize_field("purple", "colour").unwrap_err();

        assert_eq!(error.kind(), ErrorKind::EnumValue);
        assert_eq!(error.value(), Some("purple"));
        assert_eq!(error.candidates(), ["Red", "green", "BLUE"]);
        assert_eq!(
            error.description(),
            "Field 'colour' has unexpected value 'purple', but expected one of [Red,green,BLUE]."
        );
    }

    #[test]
    fn mismatch_uses_the_default() {
        assert_eq!(colours().with_default("green").sanitize(42), Ok("green"));
    }

    #[test]
    fn rule_default_names_a_candidate() {
        let sanitizer = colours().with_overrides(&EnumOverrides {
            default: Some(Some(Input::from(" blue "))),
            ..Default::default()
        });
        assert_eq!(sanitizer.sanitize("purple"), Ok("BLUE"));
        assert_eq!(sanitizer.sanitize(Input::Null), Ok("BLUE"));
        assert_eq!(sanitizer.sanitize("green"), Ok("green"));

        // the sanitizer's own default wins
        assert_eq!(sanitizer.clone().with_default("Red").sanitize("purple"), Ok("Red"));

        let cleared = sanitizer.with_overrides(&EnumOverrides {
            default: Some(None),
            ..Default::default()
        });
        assert_eq!(
            cleared.sanitize("purple").unwrap_err().kind(),
            ErrorKind::EnumValue
        );
    }

    #[test]
    fn rule_default_outside_the_candidates_is_ignored() {
        let sanitizer = colours().with_overrides(&EnumOverrides {
            default: Some(Some(Input::from("purple"))),
            ..Default::default()
        });
        let error = sanitizer.sanitize("orange").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::EnumValue);
        assert_eq!(error.value(), Some("orange"));
    }

    #[test]
    fn rule_default_matches_numbers_structurally() {
        let sizes = [1_i64, 2, 3];
        let rules = EnumRules {
            default: Some(Input::from(2)),
            ..Default::default()
        };
        assert_eq!(EnumSanitizer::new(&sizes, rules).sanitize(9), Ok(2));
    }

    #[test]
    fn null_without_acceptance_fails() {
        let error = colours().sanitize_field(Input::Null, "colour").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NullValue);
        assert_eq!(error.field(), Some("colour"));
    }

    #[test]
    fn null_uses_the_default_when_configured() {
        assert_eq!(colours().with_default("Red").sanitize(Input::Null), Ok("Red"));
    }

    #[test]
    fn null_candidate_in_the_list_is_returned() {
        let candidates = [Some("on"), None, Some("off")];
        let sanitizer = EnumSanitizer::new(&candidates, EnumRules::default());
        assert_eq!(sanitizer.sanitize(Input::Null), Ok(None));
        assert_eq!(sanitizer.sanitize("ON"), Ok(Some("on")));
    }

    #[test]
    fn allow_null_needs_a_type_with_null() {
        let rules = EnumRules {
            allow_null: true,
            ..Default::default()
        };

        let optional = [Some(1_i64), Some(2)];
        let sanitizer = EnumSanitizer::new(&optional, rules.clone());
        assert_eq!(sanitizer.sanitize(Input::Null), Ok(None));

        let plain = [1_i64, 2];
        let sanitizer = EnumSanitizer::new(&plain, rules);
        assert_eq!(
            sanitizer.sanitize(Input::Null).unwrap_err().kind(),
            ErrorKind::NullValue
        );
    }

    #[test]
    fn numbers_match_structurally() {
        let sizes = [1_i64, 2, 3];
        let sanitizer = EnumSanitizer::new(&sizes, EnumRules::default());
        assert_eq!(sanitizer.sanitize(2), Ok(2));
        assert_eq!(sanitizer.sanitize(2.0), Ok(2));
        // text is never converted into a number
        assert!(sanitizer.sanitize("2").is_err());
    }

    #[test]
    fn case_insensitive_matching_ignores_non_string_candidates() {
        let mixed = [Input::from(1), Input::from("one")];
        let sanitizer = EnumSanitizer::new(&mixed, EnumRules::default());
        assert_eq!(sanitizer.sanitize("ONE"), Ok(Input::from("one")));
        assert_eq!(sanitizer.sanitize(1), Ok(Input::from(1)));
    }

    #[test]
    fn or_null_short_circuits_blank_input() {
        let sanitizer = colours().or_null();
        assert_eq!(sanitizer.sanitize(Input::Missing), Ok(None));
        assert_eq!(sanitizer.sanitize(Input::Null), Ok(None));
        assert_eq!(sanitizer.sanitize("GREEN"), Ok(Some("green")));
    }

    #[test]
    fn json_keys_require_booleans() {
        let mut update = EnumOverrides::default();
        EnumRules::parse_key("caseSensitive", &serde_json::json!(true), &mut update)
            .expect("valid");
        assert_eq!(update.case_sensitive, Some(true));
        assert!(EnumRules::parse_key("allowNull", &serde_json::json!("yes"), &mut update).is_err());
    }

    #[test]
    fn json_default_accepts_any_value_and_null_clears() {
        let mut update = EnumOverrides::default();
        EnumRules::parse_key("default", &serde_json::json!("green"), &mut update).expect("valid");
        assert_eq!(update.default, Some(Some(Input::from("green"))));

        EnumRules::parse_key("default", &serde_json::json!(3), &mut update).expect("valid");
        assert_eq!(update.default, Some(Some(Input::Number(3.0))));

        EnumRules::parse_key("default", &serde_json::json!(null), &mut update).expect("valid");
        assert_eq!(update.default, Some(None));
    }

    mod proptests {
        use super::*;
        use crate::test_utils::arb_padding;
        use proptest::prelude::*;

        proptest! {
            /// Property: every candidate is found from any padded, re-cased spelling
            #[test]
            fn proptest_candidates_match_any_spelling(
                index in 0_usize..COLOURS.len(),
                left in arb_padding(),
                right in arb_padding(),
                upper in any::<bool>(),
            ) {
                let word = COLOURS[index];
                let word = if upper { word.to_uppercase() } else { word.to_lowercase() };

                prop_assert_eq!(colours().sanitize(format!("{left}{word}{right}")), Ok(COLOURS[index]));
            }

            /// Property: the result is always a member of the candidate list
            #[test]
            fn proptest_result_is_a_candidate(text in "\\PC{0,12}") {
                if let Ok(found) = colours().with_default("green").sanitize(text) {
                    prop_assert!(COLOURS.contains(&found));
                }
            }
        }
    }
}
