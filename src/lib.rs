//! Layered rule resolution and type coercion for untrusted scalar input.
//!
//! Values arriving from outside the program (form fields, query strings,
//! JSON documents) are converted into typed domains under configurable rules:
//! - **Booleans**: word lists, trimming and case folding
//! - **Integers**: signed, unsigned and ranged, with policies for `NaN`,
//!   infinities, negatives and out-of-range values
//! - **Enumerations**: map input onto a fixed candidate list
//! - **UUIDs** and **email addresses**: pattern checks with normalization
//!
//! Every rule has three layers. A hard-coded default is overridden by the
//! process-wide value held in a [`RuleStore`], which is overridden in turn by
//! a per-call value. Rules that say `Fail` produce a [`SanitizeError`] that
//! names the rejected field and value.
//!
//! # Core Types
//!
//! - [`Input`]: Untyped scalar received at the boundary
//! - [`Sanitizer`]: Trait every coercer implements
//! - [`Fallback`] / [`Disposition`]: Rule values for defaults and irregular input
//! - [`RuleStore`]: Process-wide rules of one domain
//! - [`Field`]: Named slot that sanitizes every assignment
//!
//! # Examples
//!
//! ```
//! use scalar_sanitize::{
//!     BoolSanitizer, Disposition, ErrorKind, IntegerOverrides, Sanitizer, SignedSanitizer,
//! };
//!
//! // Defaults are lenient: unknown words fall back to `false`
//! let agree = BoolSanitizer::default();
//! assert_eq!(agree.sanitize(" Yes "), Ok(true));
//! assert_eq!(agree.sanitize("maybe"), Ok(false));
//!
//! // Per-call rules tighten them
//! let age = SignedSanitizer::default().with_overrides(&IntegerOverrides {
//!     null_values: Some(Disposition::Fail),
//!     ..Default::default()
//! });
//! assert_eq!(age.sanitize("42"), Ok(Some(42)));
//!
//! let error = age.sanitize_field(None::<i64>, "age").unwrap_err();
//! assert_eq!(error.kind(), ErrorKind::NullValue);
//! assert_eq!(error.to_string(), "Null value: Field 'age' cannot be null.");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod boolean;
pub mod email;
pub mod enumeration;
mod error;
pub mod field;
mod input;
pub mod integer;
pub mod numeric;
pub mod rules;
mod sanitizer;
pub mod store;
pub mod uuid;

#[cfg(test)]
mod test_utils;

pub use crate::boolean::{BoolOverrides, BoolRules, BoolSanitizer};
pub use crate::email::{EmailGrammar, EmailOverrides, EmailRules, EmailSanitizer};
pub use crate::enumeration::{Candidate, EnumOverrides, EnumRules, EnumSanitizer};
pub use crate::error::{ErrorKind, RuleError, SanitizeError};
pub use crate::field::Field;
pub use crate::input::Input;
pub use crate::integer::{
    InfiniteValues, IntRange, IntegerOverrides, IntegerRules, NanValues, OutOfRangeValues,
    RangedSanitizer, SignedSanitizer, SignedValues, UnsignedSanitizer,
};
pub use crate::rules::{Disposition, Fallback, RuleSet};
pub use crate::sanitizer::{OrNull, Sanitizer};
pub use crate::store::RuleStore;
pub use crate::uuid::{UuidDefault, UuidOverrides, UuidRules, UuidSanitizer};
