use crate::error::SanitizeError;
use crate::input::Input;

/// Trait for converting untyped input into one typed domain.
///
/// `Sanitizer` is the seam every coercer in this crate implements. An
/// implementation holds its effective rules and is a pure function of the
/// input and those rules: no I/O, no shared state.
///
/// # Invariants
///
/// Implementations MUST:
/// - Either return a value of the domain or one [`SanitizeError`]; there is no
///   unchecked fallthrough
/// - Attach the field name given to [`sanitize_with`](Self::sanitize_with) to
///   every error they raise
/// - Never store the field name
///
/// # Examples
///
/// ```
/// use scalar_sanitize::{BoolSanitizer, ErrorKind, Sanitizer};
///
/// let sanitizer = BoolSanitizer::default();
/// assert_eq!(sanitizer.sanitize("yes"), Ok(true));
///
/// let strict = sanitizer.with_overrides(&scalar_sanitize::BoolOverrides {
///     null_values: Some(scalar_sanitize::Disposition::Fail),
///     ..Default::default()
/// });
/// let error = strict.sanitize_field(None::<bool>, "newsletter").unwrap_err();
/// assert_eq!(error.kind(), ErrorKind::NullValue);
/// assert_eq!(error.field(), Some("newsletter"));
/// ```
pub trait Sanitizer {
    /// The domain type produced on success.
    type Output;

    /// Sanitizes `input`, naming `field` in any error.
    ///
    /// # Errors
    ///
    /// Returns [`SanitizeError`] when the rules demand a failure for this input.
    fn sanitize_with(&self, input: Input, field: Option<&str>)
        -> Result<Self::Output, SanitizeError>;

    /// Sanitizes `input` without a field name.
    ///
    /// # Errors
    ///
    /// See [`sanitize_with`](Self::sanitize_with).
    fn sanitize(&self, input: impl Into<Input>) -> Result<Self::Output, SanitizeError>
    where
        Self: Sized,
    {
        self.sanitize_with(input.into(), None)
    }

    /// Sanitizes `input` on behalf of the named field.
    ///
    /// # Errors
    ///
    /// See [`sanitize_with`](Self::sanitize_with).
    fn sanitize_field(
        &self,
        input: impl Into<Input>,
        field: &str,
    ) -> Result<Self::Output, SanitizeError>
    where
        Self: Sized,
    {
        self.sanitize_with(input.into(), Some(field))
    }

    /// Wraps this sanitizer so that blank input yields `None` instead of
    /// reaching the rules.
    fn or_null(self) -> OrNull<Self>
    where
        Self: Sized,
    {
        OrNull(self)
    }
}

/// A sanitizer that short-circuits blank input to `None`.
///
/// Missing input, null, `NaN` and strings made only of whitespace never reach
/// the wrapped sanitizer; everything else is sanitized as usual.
///
/// # Examples
///
/// ```
/// use scalar_sanitize::{Sanitizer, UuidSanitizer};
///
/// let optional_id = UuidSanitizer::default().or_null();
/// assert_eq!(optional_id.sanitize("   "), Ok(None));
/// assert!(optional_id.sanitize("not-a-uuid").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct OrNull<S>(S);

impl<S> OrNull<S> {
    /// Returns the wrapped sanitizer.
    pub fn inner(&self) -> &S {
        &self.0
    }
}

impl<S: Sanitizer> Sanitizer for OrNull<S> {
    type Output = Option<S::Output>;

    fn sanitize_with(
        &self,
        input: Input,
        field: Option<&str>,
    ) -> Result<Self::Output, SanitizeError> {
        if input.is_blank() {
            return Ok(None);
        }
        self.0.sanitize_with(input, field).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    /// Accepts only the literal string "ok".
    struct OkOnly;

    impl Sanitizer for OkOnly {
        type Output = String;

        fn sanitize_with(
            &self,
            input: Input,
            field: Option<&str>,
        ) -> Result<String, SanitizeError> {
            match input {
                Input::Str(s) if s == "ok" => Ok(s),
                other => Err(SanitizeError::new(ErrorKind::UnexpectedValue)
                    .with_field(field)
                    .with_value(other.to_string())),
            }
        }
    }

    #[test]
    fn sanitize_passes_no_field() {
        let error = OkOnly.sanitize("nope").unwrap_err();
        assert_eq!(error.field(), None);
        assert_eq!(error.value(), Some("nope"));
    }

    #[test]
    fn sanitize_field_forwards_the_name() {
        let error = OkOnly.sanitize_field(3, "count").unwrap_err();
        assert_eq!(error.field(), Some("count"));
    }

    #[test]
    fn or_null_short_circuits_blank_input() {
        let sanitizer = OkOnly.or_null();

        assert_eq!(sanitizer.sanitize(Input::Missing), Ok(None));
        assert_eq!(sanitizer.sanitize(Input::Null), Ok(None));
        assert_eq!(sanitizer.sanitize(f64::NAN), Ok(None));
        assert_eq!(sanitizer.sanitize(" \t"), Ok(None));
    }

    #[test]
    fn or_null_delegates_everything_else() {
        let sanitizer = OkOnly.or_null();

        assert_eq!(sanitizer.sanitize("ok"), Ok(Some("ok".to_string())));
        assert!(sanitizer.sanitize("nope").is_err());
        assert!(sanitizer.sanitize(0).is_err());
    }

    #[test]
    fn sanitizer_is_usable_as_trait_object() {
        let sanitizers: Vec<Box<dyn Sanitizer<Output = String>>> = vec![Box::new(OkOnly)];
        for sanitizer in &sanitizers {
            assert!(sanitizer.sanitize_with(Input::from("ok"), None).is_ok());
        }
    }
}
