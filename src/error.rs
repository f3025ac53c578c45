use std::fmt;

use thiserror::Error;

/// Error returned when a coercer cannot produce a value.
///
/// Every error carries its [`ErrorKind`] and, when known, the name of the field
/// being sanitized and the offending value. A transport layer (an HTTP error
/// mapper, a form renderer) reads these through the accessors to build its own
/// response; this type knows nothing about any wire format.
///
/// # Examples
///
/// ```
/// use scalar_sanitize::{ErrorKind, SanitizeError};
///
/// let error = SanitizeError::new(ErrorKind::NullValue).with_field(Some("email"));
/// assert_eq!(error.kind(), ErrorKind::NullValue);
/// assert_eq!(error.field(), Some("email"));
/// assert_eq!(error.to_string(), "Null value: Field 'email' cannot be null.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizeError {
    kind: ErrorKind,
    field: Option<String>,
    value: Option<String>,
    candidates: Vec<String>,
}

impl SanitizeError {
    /// Creates a new error of the given kind with no context attached.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            field: None,
            value: None,
            candidates: Vec::new(),
        }
    }

    /// Attaches the field name, if any.
    pub fn with_field(mut self, field: Option<&str>) -> Self {
        self.field = field.map(str::to_string);
        self
    }

    /// Attaches the offending value in its textual form.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Attaches the list of accepted values.
    pub fn with_candidates(mut self, candidates: Vec<String>) -> Self {
        self.candidates = candidates;
        self
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the short, human-readable title of the error kind.
    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    /// Returns the name of the field being sanitized, if one was given.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns the offending value, if it was recorded.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Returns the accepted values for an [`ErrorKind::EnumValue`] error.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Builds the sentence describing what went wrong.
    pub fn description(&self) -> String {
        let value = self.value.as_deref().unwrap_or_default();
        match (self.kind, self.field.as_deref()) {
            (ErrorKind::NullValue, Some(field)) => format!("Field '{field}' cannot be null."),
            (ErrorKind::NullValue, None) => "Value cannot be null.".to_string(),
            (ErrorKind::UndefinedValue, Some(field)) => {
                format!("Missing value for field '{field}', it is not optional.")
            }
            (ErrorKind::UndefinedValue, None) => "Value is missing or undefined.".to_string(),
            (ErrorKind::NanValue, Some(field)) => format!("Field '{field}' is not a number."),
            (ErrorKind::NanValue, None) => "Provided value is not a number.".to_string(),
            (ErrorKind::NegativeValue, Some(field)) => {
                format!("Field '{field}' cannot be negative.")
            }
            (ErrorKind::NegativeValue, None) => "Value cannot be negative.".to_string(),
            (ErrorKind::InfiniteValue, Some(field)) => {
                format!("Field '{field}' cannot be infinite.")
            }
            (ErrorKind::InfiniteValue, None) => "Value must be finite.".to_string(),
            (ErrorKind::OutOfRangeValue, Some(field)) => {
                format!("Received out of range value '{value}' for field '{field}'.")
            }
            (ErrorKind::OutOfRangeValue, None) => {
                format!("Received out of range value '{value}'.")
            }
            (ErrorKind::UnexpectedValue, field) => match (field, self.value.as_deref()) {
                (Some(field), Some(value)) => {
                    format!("Received unexpected value '{value}' for field '{field}'.")
                }
                (Some(field), None) => format!("Received unexpected value for field '{field}'."),
                (None, Some(value)) => format!("Received unexpected value '{value}'."),
                (None, None) => "Received unexpected value.".to_string(),
            },
            (ErrorKind::EnumValue, Some(field)) => format!(
                "Field '{field}' has unexpected value '{value}', but expected one of [{}].",
                self.candidates.join(",")
            ),
            (ErrorKind::EnumValue, None) => format!(
                "Found unexpected value '{value}', but expected one of [{}].",
                self.candidates.join(",")
            ),
            (ErrorKind::InvalidUuid, Some(field)) => {
                format!("Received value '{value}' for field '{field}' was not a valid UUID.")
            }
            (ErrorKind::InvalidUuid, None) => {
                format!("Received value '{value}' was not a valid UUID.")
            }
            (ErrorKind::InvalidEmail, Some(field)) => format!(
                "Received value '{value}' for field '{field}' was not a valid email address."
            ),
            (ErrorKind::InvalidEmail, None) => {
                format!("Received value '{value}' was not a valid email address.")
            }
        }
    }
}

impl fmt::Display for SanitizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.title(), self.description())
    }
}

impl std::error::Error for SanitizeError {}

/// Kind of sanitization failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Null input with no configured substitute.
    NullValue,
    /// Missing input with no configured substitute.
    UndefinedValue,
    /// Input that is not a number where one was expected.
    NanValue,
    /// Negative result where only unsigned values are accepted.
    NegativeValue,
    /// Non-finite result where the policy demands an error.
    InfiniteValue,
    /// Result outside the accepted range where the policy demands an error.
    OutOfRangeValue,
    /// Input that cannot be coerced and has no default to fall back on.
    UnexpectedValue,
    /// Input with no match among the accepted values.
    EnumValue,
    /// Text that is not a UUID.
    InvalidUuid,
    /// Text that is not an email address.
    InvalidEmail,
}

impl ErrorKind {
    /// Short title, suitable as a heading in user-facing messages.
    pub fn title(self) -> &'static str {
        match self {
            Self::NullValue => "Null value",
            Self::UndefinedValue => "Undefined value",
            Self::NanValue => "Not a number",
            Self::NegativeValue => "Negative value",
            Self::InfiniteValue => "Infinite value",
            Self::OutOfRangeValue => "Out of range",
            Self::UnexpectedValue => "Unexpected value",
            Self::EnumValue => "Enum value",
            Self::InvalidUuid => "Invalid UUID",
            Self::InvalidEmail => "Invalid Email Address",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Error returned when a rule set or a coercer configuration is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// Rule updates supplied as JSON must be objects.
    #[error("{domain} sanitizer rules must be given as a JSON object")]
    NotAnObject {
        /// Sanitizer domain the update was meant for.
        domain: &'static str,
    },

    /// A known rule key was given a value of the wrong shape.
    #[error("invalid value for {domain} sanitizer rule '{key}': expected {expected}")]
    InvalidValue {
        /// Sanitizer domain the update was meant for.
        domain: &'static str,
        /// The rule key.
        key: String,
        /// Description of the accepted values.
        expected: &'static str,
    },

    /// The lower bound of a range is above its upper bound.
    #[error("invalid range: minimum {min} is greater than maximum {max}")]
    InvalidRange {
        /// Requested lower bound.
        min: i64,
        /// Requested upper bound.
        max: i64,
    },
}
