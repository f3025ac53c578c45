//! Named fields that sanitize every value assigned to them.
//!
//! A [`Field`] binds a field name to a sanitizer and keeps the last accepted
//! value. Each assignment goes through the sanitizer with the field name
//! attached, so errors always say which field rejected the input.

use std::fmt;

use crate::error::{ErrorKind, SanitizeError};
use crate::input::Input;
use crate::sanitizer::Sanitizer;

/// Rejects missing and null input on behalf of `field`, passing anything else through.
///
/// # Errors
///
/// Returns [`ErrorKind::UndefinedValue`] for missing input and
/// [`ErrorKind::NullValue`] for null input.
///
/// # Examples
///
/// ```
/// use scalar_sanitize::{field, ErrorKind, Input};
///
/// assert_eq!(field::require_present(Input::from(3), "age"), Ok(Input::from(3)));
///
/// let error = field::require_present(Input::Null, "age").unwrap_err();
/// assert_eq!(error.kind(), ErrorKind::NullValue);
/// assert_eq!(error.field(), Some("age"));
/// ```
pub fn require_present(input: Input, field: &str) -> Result<Input, SanitizeError> {
    match input {
        Input::Missing => Err(SanitizeError::new(ErrorKind::UndefinedValue).with_field(Some(field))),
        Input::Null => Err(SanitizeError::new(ErrorKind::NullValue).with_field(Some(field))),
        other => Ok(other),
    }
}

/// A named slot whose assignments are sanitized.
///
/// # Examples
///
/// ```
/// use scalar_sanitize::{ErrorKind, Field, IntRange, Input, RangedSanitizer};
///
/// let range = IntRange::new(1, 10)?;
/// let mut rating = Field::new("rating", RangedSanitizer::new(Default::default(), range))
///     .required();
///
/// assert_eq!(rating.assign("42"), Ok(&Some(10)));
/// assert_eq!(rating.get(), Some(&Some(10)));
///
/// let error = rating.assign(Input::Null).unwrap_err();
/// assert_eq!(error.kind(), ErrorKind::NullValue);
/// assert_eq!(error.field(), Some("rating"));
/// // a rejected assignment keeps the previous value
/// assert_eq!(rating.get(), Some(&Some(10)));
/// # Ok::<(), scalar_sanitize::RuleError>(())
/// ```
pub struct Field<S: Sanitizer> {
    name: String,
    sanitizer: S,
    required: bool,
    value: Option<S::Output>,
}

impl<S: Sanitizer> Field<S> {
    /// Creates an empty field.
    pub fn new(name: impl Into<String>, sanitizer: S) -> Self {
        Self {
            name: name.into(),
            sanitizer,
            required: false,
            value: None,
        }
    }

    /// Rejects missing and null input before it reaches the sanitizer.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Returns the field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the sanitizer.
    pub fn sanitizer(&self) -> &S {
        &self.sanitizer
    }

    /// Returns the last accepted value, if any.
    pub fn get(&self) -> Option<&S::Output> {
        self.value.as_ref()
    }

    /// Removes and returns the last accepted value.
    pub fn take(&mut self) -> Option<S::Output> {
        self.value.take()
    }

    /// Sanitizes `input` without storing it.
    ///
    /// # Errors
    ///
    /// Returns the [`SanitizeError`] of the presence check or the sanitizer.
    pub fn check(&self, input: impl Into<Input>) -> Result<S::Output, SanitizeError> {
        let mut input = input.into();
        if self.required {
            input = require_present(input, &self.name)?;
        }
        self.sanitizer.sanitize_with(input, Some(&self.name))
    }

    /// Sanitizes and stores `input`. On error the previous value is kept.
    ///
    /// # Errors
    ///
    /// See [`check`](Self::check).
    pub fn assign(&mut self, input: impl Into<Input>) -> Result<&S::Output, SanitizeError> {
        let value = self.check(input)?;
        Ok(&*self.value.insert(value))
    }
}

impl<S> fmt::Debug for Field<S>
where
    S: Sanitizer + fmt::Debug,
    S::Output: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("sanitizer", &self.sanitizer)
            .field("required", &self.required)
            .field("value", &self.value)
            .finish()
    }
}
