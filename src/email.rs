//! Email address coercion.
//!
//! Input is rendered to text, trimmed, lowercased and matched against one of
//! two grammars. Only the shape is checked; nothing here resolves domains or
//! contacts a mail server.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::trace;

use crate::error::{ErrorKind, RuleError, SanitizeError};
use crate::input::Input;
use crate::rules::{self, resolve, Fallback, RuleSet};
use crate::sanitizer::Sanitizer;
use crate::store;

// Grammar of <input type="email"> in HTML forms.
static HTML_INPUT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@",
        r"[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?",
        r"(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    ))
    .expect("html email pattern is valid")
});

// RFC 5322 addr-spec, including quoted local parts and IP literals.
static RFC5322: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"^(?:[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*"#,
        r#"|"(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21\x23-\x5b\x5d-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*")"#,
        r"@(?:(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?",
        r"|\[(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}",
        r"(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?",
        r"|[a-z0-9-]*[a-z0-9]:(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21-\x5a\x53-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])+)\])$",
    ))
    .expect("rfc 5322 email pattern is valid")
});

/// Which address grammar to accept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmailGrammar {
    /// The grammar browsers apply to email form fields. Stricter than
    /// RFC 5322 before the `@`, looser after it.
    #[default]
    HtmlInput,
    /// RFC 5322, accepting quoted local parts and bracketed IP domains.
    Rfc5322,
}

impl EmailGrammar {
    fn pattern(self) -> &'static Regex {
        match self {
            EmailGrammar::HtmlInput => &*HTML_INPUT,
            EmailGrammar::Rfc5322 => &*RFC5322,
        }
    }

    /// Returns `true` if the already normalized `text` is an address in this grammar.
    pub fn is_match(self, text: &str) -> bool {
        self.pattern().is_match(text)
    }
}

/// Email sanitizer rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailRules {
    /// Result for input that is not an address. Default: fail.
    pub default: Fallback<String>,
    /// Trim before matching. Default `true`.
    pub trim_strings: bool,
}

impl Default for EmailRules {
    fn default() -> Self {
        Self {
            default: Fallback::Fail,
            trim_strings: true,
        }
    }
}

/// Partial [`EmailRules`]; `None` keeps the underlying value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailOverrides {
    /// See [`EmailRules::default`].
    pub default: Option<Fallback<String>>,
    /// See [`EmailRules::trim_strings`].
    pub trim_strings: Option<bool>,
}

impl RuleSet for EmailRules {
    type Overrides = EmailOverrides;

    const DOMAIN: &'static str = "email";

    const KEYS: &'static [&'static str] = &["default", "trimStrings"];

    fn resolve(&self, local: &EmailOverrides) -> Self {
        Self {
            default: resolve(&local.default, &self.default),
            trim_strings: resolve(&local.trim_strings, &self.trim_strings),
        }
    }

    fn apply(&mut self, update: EmailOverrides) {
        *self = self.resolve(&update);
    }

    fn parse_key(key: &str, value: &Value, update: &mut EmailOverrides) -> Result<(), RuleError> {
        match key {
            "default" => {
                update.default = Some(rules::parse_fallback(
                    Self::DOMAIN,
                    key,
                    value,
                    |v| v.as_str().map(str::to_string),
                    "a string or \"error\"",
                )?)
            }
            "trimStrings" => update.trim_strings = Some(rules::parse_bool(Self::DOMAIN, key, value)?),
            _ => {}
        }
        Ok(())
    }
}

/// Validates and normalizes email addresses.
///
/// # Examples
///
/// ```
/// use scalar_sanitize::{EmailSanitizer, ErrorKind, Sanitizer};
///
/// let sanitizer = EmailSanitizer::html_input();
/// assert_eq!(
///     sanitizer.sanitize("  Jane.Doe@Example.COM ").as_deref(),
///     Ok("jane.doe@example.com")
/// );
/// assert_eq!(
///     sanitizer.sanitize("jane@").unwrap_err().kind(),
///     ErrorKind::InvalidEmail
/// );
///
/// let strict = EmailSanitizer::rfc5322();
/// assert!(strict.sanitize("\"jane..doe\"@example.com").is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EmailSanitizer {
    rules: Arc<EmailRules>,
    grammar: EmailGrammar,
}

impl EmailSanitizer {
    /// Creates a sanitizer with fixed rules and grammar.
    pub fn new(rules: EmailRules, grammar: EmailGrammar) -> Self {
        Self {
            rules: Arc::new(rules),
            grammar,
        }
    }

    /// Creates a sanitizer for the HTML form grammar with default rules.
    pub fn html_input() -> Self {
        Self::new(EmailRules::default(), EmailGrammar::HtmlInput)
    }

    /// Creates a sanitizer for the RFC 5322 grammar with default rules.
    pub fn rfc5322() -> Self {
        Self::new(EmailRules::default(), EmailGrammar::Rfc5322)
    }

    /// Creates a sanitizer from the current process-wide rules.
    pub fn global(grammar: EmailGrammar) -> Self {
        Self {
            rules: store::EMAIL.snapshot(),
            grammar,
        }
    }

    /// Returns a sanitizer whose rules are these rules overridden by `local`.
    pub fn with_overrides(&self, local: &EmailOverrides) -> Self {
        Self::new(self.rules.resolve(local), self.grammar)
    }

    /// Returns the effective rules.
    pub fn rules(&self) -> &EmailRules {
        &self.rules
    }

    /// Returns the accepted grammar.
    pub fn grammar(&self) -> EmailGrammar {
        self.grammar
    }
}

impl Sanitizer for EmailSanitizer {
    type Output = String;

    fn sanitize_with(&self, input: Input, field: Option<&str>) -> Result<String, SanitizeError> {
        let text = input.to_string();
        let text = if self.rules.trim_strings {
            text.trim()
        } else {
            text.as_str()
        };
        let normalized = text.to_lowercase();

        if self.grammar.is_match(&normalized) {
            return Ok(normalized);
        }

        trace!(grammar = ?self.grammar, "email input rejected");
        self.rules.default.or_fail(|| {
            SanitizeError::new(ErrorKind::InvalidEmail)
                .with_field(field)
                .with_value(normalized.as_str())
        })
    }
}

fn check(
    grammar: EmailGrammar,
    input: Input,
    local: Option<&EmailOverrides>,
    field: Option<&str>,
) -> Result<String, SanitizeError> {
    let global = EmailSanitizer::global(grammar);
    match local {
        Some(local) => global.with_overrides(local).sanitize_with(input, field),
        None => global.sanitize_with(input, field),
    }
}

/// Validates an address against the HTML form grammar with the process-wide
/// rules overridden by `local`.
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidEmail`] when the input does not match and the
/// `default` rule is [`Fallback::Fail`].
pub fn html_input(
    input: impl Into<Input>,
    local: Option<&EmailOverrides>,
    field: Option<&str>,
) -> Result<String, SanitizeError> {
    check(EmailGrammar::HtmlInput, input.into(), local, field)
}

/// Validates an address against RFC 5322 with the process-wide rules
/// overridden by `local`.
///
/// # Errors
///
/// See [`html_input`].
pub fn rfc5322(
    input: impl Into<Input>,
    local: Option<&EmailOverrides>,
    field: Option<&str>,
) -> Result<String, SanitizeError> {
    check(EmailGrammar::Rfc5322, input.into(), local, field)
}
